use std::io::Read;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::BetStore;
use crate::error::{validate_odd, validate_payout, validate_required, validate_stake, AppError};
use crate::ingest::{parse_bets_csv, RowError};
use crate::models::{derive_profit, Bet, BetStats, BetUpdate, NewBet};
use crate::stats::{aggregate, resolve_date_range};

const ORDER_ID_LEN: usize = 16;

/// Query parameters accepted by the stats endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    /// One of "today", "7days", "30days", "all"
    pub filter: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportSummary {
    pub rows: usize,
    pub imported: u64,
    pub errors: Vec<RowError>,
}

/// Bet bookkeeping on top of the store
#[derive(Clone)]
pub struct BetService {
    store: Arc<BetStore>,
}

impl BetService {
    pub fn new(store: Arc<BetStore>) -> Self {
        Self { store }
    }

    /// Record a new bet
    pub async fn create(&self, bet: NewBet) -> Result<Bet, AppError> {
        validate_new_bet(&bet)?;

        let profit = derive_profit(bet.stake, bet.payout_value);
        let created_at = bet.created_at.unwrap_or_else(|| Local::now().naive_local());

        let stored = self
            .store
            .insert_bet(&bet, &new_order_id(), profit, created_at)
            .await?;

        info!(
            "Recorded bet {} for user {} | {} | stake {:.2} @ {:.2}",
            stored.id, stored.user_id, stored.event, stored.stake, stored.odd
        );
        Ok(stored)
    }

    /// All bets, newest first
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Bet>, AppError> {
        Ok(self.store.list_bets(user_id).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Bet, AppError> {
        self.store
            .get_bet(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bet {} not found", id)))
    }

    /// Apply a partial update, keeping profit in line with payout and stake
    pub async fn update(&self, id: i64, changes: BetUpdate) -> Result<Bet, AppError> {
        let mut bet = self.get(id).await?;
        apply_update(&mut bet, changes)?;
        bet.updated_at = Some(Local::now().naive_local());

        if !self.store.update_bet(&bet).await? {
            return Err(AppError::NotFound(format!("Bet {} not found", id)));
        }

        info!("Updated bet {} ({})", bet.id, bet.result.as_str());
        Ok(bet)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_bet(id).await? {
            return Err(AppError::NotFound(format!("Bet {} not found", id)));
        }

        info!("Deleted bet {}", id);
        Ok(())
    }

    /// Performance report for a user over the requested period
    pub async fn stats(&self, user_id: &str, query: &StatsQuery) -> Result<BetStats, AppError> {
        let range = resolve_date_range(
            query.filter.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;

        debug!("Computing stats for user {} over {:?}", user_id, range);

        let bets = self.store.bets_for_user(user_id, range).await?;
        Ok(aggregate(&bets)?)
    }

    /// Import bets from CSV; bad rows are reported, good rows stored together
    pub async fn import_csv<R: Read>(
        &self,
        user_id: &str,
        reader: R,
    ) -> Result<ImportSummary, AppError> {
        validate_required("user_id", user_id)?;

        let parsed = parse_bets_csv(user_id, reader);
        let rows = parsed.bets.len() + parsed.errors.len();
        let mut errors = parsed.errors;

        let mut batch = Vec::with_capacity(parsed.bets.len());
        for (line, bet) in parsed.bets {
            if let Err(err) = validate_new_bet(&bet) {
                errors.push(RowError {
                    line,
                    message: err.to_string(),
                });
                continue;
            }

            let profit = derive_profit(bet.stake, bet.payout_value);
            let created_at = bet.created_at.unwrap_or_else(|| Local::now().naive_local());
            batch.push((bet, new_order_id(), profit, created_at));
        }

        let imported = if batch.is_empty() {
            0
        } else {
            self.store.insert_many(&batch).await?
        };

        errors.sort_by_key(|e| e.line);
        info!(
            "CSV import for user {}: {} of {} rows imported",
            user_id, imported, rows
        );

        Ok(ImportSummary {
            rows,
            imported,
            errors,
        })
    }
}

fn validate_new_bet(bet: &NewBet) -> Result<(), AppError> {
    validate_required("user_id", &bet.user_id)?;
    validate_required("event", &bet.event)?;
    validate_odd(bet.odd)?;
    validate_stake(bet.stake)?;
    validate_payout(bet.payout_value)
}

fn apply_update(bet: &mut Bet, changes: BetUpdate) -> Result<(), AppError> {
    if let Some(event) = changes.event {
        validate_required("event", &event)?;
        bet.event = event;
    }
    if let Some(market) = changes.market {
        bet.market = Some(market);
    }
    if let Some(odd) = changes.odd {
        validate_odd(odd)?;
        bet.odd = odd;
    }
    if let Some(stake) = changes.stake {
        validate_stake(stake)?;
        bet.stake = stake;
    }
    if changes.payout_value.is_some() {
        validate_payout(changes.payout_value)?;
        bet.payout_value = changes.payout_value;
    }
    if let Some(result) = changes.result {
        bet.result = result;
    }
    if let Some(is_live) = changes.is_live {
        bet.is_live = is_live;
    }
    if let Some(source) = changes.source {
        bet.source = source;
    }
    if let Some(receipt_image) = changes.receipt_image {
        bet.receipt_image = Some(receipt_image);
    }

    if bet.payout_value.is_some() {
        bet.profit = derive_profit(bet.stake, bet.payout_value);
    }
    Ok(())
}

/// Short random order reference (hex)
pub fn new_order_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ORDER_ID_LEN);
    id
}
