use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Performance of a single betting market
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketStats {
    pub total_bets: u64,
    pub wins: u64,
    pub losses: u64,
    pub cashouts: u64,
    /// Cashouts that closed with profit > 0
    pub cashouts_positive: u64,
    pub total_stake: f64,
    pub total_profit: f64,
    /// Percentage, 2 decimals
    pub win_rate: f64,
    /// Percentage, 2 decimals
    pub roi: f64,
}

/// Count of bets per result tag
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultCounts {
    pub win: u64,
    pub loss: u64,
    pub pending: u64,
    pub void: u64,
    pub cashout: u64,
}

impl ResultCounts {
    pub fn total(&self) -> u64 {
        self.win + self.loss + self.pending + self.void + self.cashout
    }
}

/// Aggregate performance report for a user over a period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetStats {
    pub total_bets: u64,
    pub total_stake: f64,
    pub total_profit: f64,
    pub avg_odd: f64,
    pub win_rate: f64,
    pub roi: f64,
    pub by_result: ResultCounts,
    /// Keyed by market name, in first-seen order
    pub by_market: IndexMap<String, MarketStats>,
    /// Market with the highest win rate
    pub best_market: Option<String>,
    /// Market with the most losses
    pub worst_market: Option<String>,
    pub positive_cashouts: u64,
    pub positive_cashouts_profit: f64,
}
