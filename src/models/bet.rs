use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single wager recorded for a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    /// Unique bet identifier
    pub id: i64,

    /// Owning user (opaque identifier)
    pub user_id: String,

    /// Short bookmaker-style order reference (16 hex chars)
    pub order_id: Option<String>,

    /// Event name (e.g., "Flamengo x Palmeiras")
    pub event: String,

    /// Betting market (e.g., "1X2"); empty or absent markets are not grouped
    pub market: Option<String>,

    /// Decimal odd taken
    pub odd: f64,

    /// Amount wagered
    pub stake: f64,

    /// Amount returned on settlement, when known
    pub payout_value: Option<f64>,

    /// payout_value - stake, present whenever payout_value is known
    pub profit: Option<f64>,

    /// Settlement result
    pub result: BetResult,

    /// Whether the bet was placed in-play
    pub is_live: bool,

    /// Where the record came from ("manual", "csv", ...)
    pub source: String,

    /// Reference to an uploaded receipt image
    pub receipt_image: Option<String>,

    /// When the bet was recorded (server local time)
    pub created_at: NaiveDateTime,

    /// Last modification time
    pub updated_at: Option<NaiveDateTime>,
}

impl Bet {
    /// Market name if it is present and non-empty
    pub fn market_name(&self) -> Option<&str> {
        self.market.as_deref().filter(|m| !m.is_empty())
    }
}

/// Settlement result of a bet
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    #[default]
    Pending,
    Win,
    Loss,
    Void,
    /// Settled early at a bookmaker-offered value
    Cashout,
}

impl BetResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Pending => "pending",
            BetResult::Win => "win",
            BetResult::Loss => "loss",
            BetResult::Void => "void",
            BetResult::Cashout => "cashout",
        }
    }

    /// Parse a result tag, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(BetResult::Pending),
            "win" => Some(BetResult::Win),
            "loss" => Some(BetResult::Loss),
            "void" => Some(BetResult::Void),
            "cashout" => Some(BetResult::Cashout),
            _ => None,
        }
    }
}

/// Payload for recording a new bet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBet {
    pub user_id: String,
    pub event: String,
    #[serde(default)]
    pub market: Option<String>,
    pub odd: f64,
    pub stake: f64,
    #[serde(default)]
    pub payout_value: Option<f64>,
    #[serde(default)]
    pub result: BetResult,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub receipt_image: Option<String>,
    /// Backdated creation time (imports); defaults to now
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

fn default_source() -> String {
    "manual".to_string()
}

/// Partial update of an existing bet; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BetUpdate {
    pub event: Option<String>,
    pub market: Option<String>,
    pub odd: Option<f64>,
    pub stake: Option<f64>,
    pub payout_value: Option<f64>,
    pub result: Option<BetResult>,
    pub is_live: Option<bool>,
    pub source: Option<String>,
    pub receipt_image: Option<String>,
}

/// Profit derived from a settled payout
pub fn derive_profit(stake: f64, payout_value: Option<f64>) -> Option<f64> {
    payout_value.map(|payout| payout - stake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_parse() {
        assert_eq!(BetResult::parse("WIN"), Some(BetResult::Win));
        assert_eq!(BetResult::parse(" cashout "), Some(BetResult::Cashout));
        assert_eq!(BetResult::parse("won"), None);
    }

    #[test]
    fn test_result_serializes_lowercase() {
        let json = serde_json::to_string(&BetResult::Cashout).unwrap();
        assert_eq!(json, "\"cashout\"");
    }

    #[test]
    fn test_new_bet_defaults() {
        let bet: NewBet = serde_json::from_str(
            r#"{"user_id":"u1","event":"A x B","odd":1.9,"stake":10}"#,
        )
        .unwrap();

        assert_eq!(bet.result, BetResult::Pending);
        assert_eq!(bet.source, "manual");
        assert!(!bet.is_live);
        assert!(bet.market.is_none());
    }

    #[test]
    fn test_derive_profit() {
        assert_eq!(derive_profit(100.0, Some(190.0)), Some(90.0));
        assert_eq!(derive_profit(50.0, Some(0.0)), Some(-50.0));
        assert_eq!(derive_profit(50.0, None), None);
    }
}
