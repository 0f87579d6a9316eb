//! CSV parsing for bulk bet imports
//!
//! Expected header: `event,odd,stake` plus any of the optional columns
//! `market,payout_value,result,is_live,created_at,receipt_image`. Column order
//! does not matter. Numbers may use a decimal comma (`1,85`).

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{BetResult, NewBet};
use crate::stats::parse_datetime;

/// Source label stamped on imported bets
pub const CSV_SOURCE: &str = "csv";

/// A rejected CSV row (1-based, header excluded)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed rows keyed by their data line, plus the rows that were rejected
#[derive(Debug, Default)]
pub struct CsvImport {
    pub bets: Vec<(usize, NewBet)>,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Deserialize)]
struct CsvBetRecord {
    event: String,
    #[serde(default)]
    market: Option<String>,
    odd: String,
    stake: String,
    #[serde(default)]
    payout_value: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    is_live: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    receipt_image: Option<String>,
}

/// Parse every data row of `reader` into a bet owned by `user_id`
pub fn parse_bets_csv<R: Read>(user_id: &str, reader: R) -> CsvImport {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut import = CsvImport::default();

    for (index, record) in csv_reader.deserialize::<CsvBetRecord>().enumerate() {
        let line = index + 1;

        let parsed = record
            .map_err(|e| format!("Malformed row: {}", e))
            .and_then(|record| to_new_bet(user_id, record));

        match parsed {
            Ok(bet) => import.bets.push((line, bet)),
            Err(message) => {
                warn!("Skipping CSV line {}: {}", line, message);
                import.errors.push(RowError { line, message });
            }
        }
    }

    import
}

fn to_new_bet(user_id: &str, record: CsvBetRecord) -> Result<NewBet, String> {
    let result = match non_empty(record.result) {
        Some(tag) => BetResult::parse(&tag).ok_or_else(|| format!("Unknown result '{}'", tag))?,
        None => BetResult::Pending,
    };

    let is_live = match non_empty(record.is_live) {
        Some(flag) => parse_flag(&flag)?,
        None => false,
    };

    let created_at = non_empty(record.created_at)
        .map(|value| parse_datetime(&value).map_err(|e| e.to_string()))
        .transpose()?;

    let payout_value = non_empty(record.payout_value)
        .map(|value| parse_number("payout_value", &value))
        .transpose()?;

    Ok(NewBet {
        user_id: user_id.to_string(),
        event: record.event,
        market: non_empty(record.market),
        odd: parse_number("odd", &record.odd)?,
        stake: parse_number("stake", &record.stake)?,
        payout_value,
        result,
        is_live,
        source: CSV_SOURCE.to_string(),
        receipt_image: non_empty(record.receipt_image),
        created_at,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts both "1.85" and "1,85"
fn parse_number(field: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("Invalid {} '{}'", field, value))
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(format!("Invalid is_live '{}'", other)),
    }
}
