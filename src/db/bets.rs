use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

use crate::models::{Bet, BetResult, NewBet};
use crate::stats::DateRange;

/// Fixed-width timestamp layout so text comparison matches time order
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const SELECT_BETS: &str = r#"
    SELECT id, user_id, order_id, event, market, odd, stake, payout_value, profit,
           result, is_live, source, receipt_image, created_at, updated_at
    FROM bets
"#;

/// SQLite store for bet records
pub struct BetStore {
    pool: Pool<Sqlite>,
}

impl BetStore {
    /// Create a new bet store and initialize the database
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create data directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            if !path.starts_with(":memory:") {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .context("Failed to create database directory")?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        // Every connection to an in-memory database sees its own empty copy
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Bet store initialized");
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                order_id TEXT,
                event TEXT NOT NULL,
                market TEXT,
                odd REAL NOT NULL,
                stake REAL NOT NULL,
                payout_value REAL,
                profit REAL,
                result TEXT NOT NULL DEFAULT 'pending',
                is_live BOOLEAN NOT NULL DEFAULT 0,
                source TEXT NOT NULL DEFAULT 'manual',
                receipt_image TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create bets table")?;

        // Stats queries filter on user and creation time together
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bets_user_created
            ON bets (user_id, created_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bets_order
            ON bets (order_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new bet, returning the stored record
    pub async fn insert_bet(
        &self,
        bet: &NewBet,
        order_id: &str,
        profit: Option<f64>,
        created_at: NaiveDateTime,
    ) -> Result<Bet> {
        let result = bind_insert(sqlx::query(INSERT_BET), bet, order_id, profit, created_at)
            .execute(&self.pool)
            .await
            .context("Failed to insert bet")?;

        self.get_bet(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow!("Inserted bet {} vanished", result.last_insert_rowid()))
    }

    /// Insert a batch of bets atomically, returning how many were stored
    pub async fn insert_many(
        &self,
        bets: &[(NewBet, String, Option<f64>, NaiveDateTime)],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin import")?;
        let mut inserted = 0;

        for (bet, order_id, profit, created_at) in bets {
            let result = bind_insert(sqlx::query(INSERT_BET), bet, order_id, *profit, *created_at)
                .execute(&mut *tx)
                .await
                .context("Failed to insert imported bet")?;
            inserted += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit import")?;
        Ok(inserted)
    }

    /// Get a bet by id
    pub async fn get_bet(&self, id: i64) -> Result<Option<Bet>> {
        let row = sqlx::query_as::<_, BetRow>(&format!("{SELECT_BETS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch bet")?;

        row.map(Bet::try_from).transpose()
    }

    /// List bets, newest first, optionally restricted to one user
    pub async fn list_bets(&self, user_id: Option<&str>) -> Result<Vec<Bet>> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, BetRow>(&format!(
                    "{SELECT_BETS} WHERE user_id = ? ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, BetRow>(&format!(
                    "{SELECT_BETS} ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list bets")?;

        rows.into_iter().map(Bet::try_from).collect()
    }

    /// Bets of a user inside an inclusive creation window, in insertion order
    pub async fn bets_for_user(&self, user_id: &str, range: Option<DateRange>) -> Result<Vec<Bet>> {
        let rows = match range {
            Some(range) => {
                sqlx::query_as::<_, BetRow>(&format!(
                    "{SELECT_BETS} WHERE user_id = ? AND created_at >= ? AND created_at <= ? ORDER BY id"
                ))
                .bind(user_id)
                .bind(format_timestamp(range.start))
                .bind(format_timestamp(range.end))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, BetRow>(&format!(
                    "{SELECT_BETS} WHERE user_id = ? ORDER BY id"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to fetch user bets")?;

        rows.into_iter().map(Bet::try_from).collect()
    }

    /// Overwrite the mutable fields of a bet; returns false if it does not exist
    pub async fn update_bet(&self, bet: &Bet) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bets SET
                event = ?,
                market = ?,
                odd = ?,
                stake = ?,
                payout_value = ?,
                profit = ?,
                result = ?,
                is_live = ?,
                source = ?,
                receipt_image = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&bet.event)
        .bind(&bet.market)
        .bind(bet.odd)
        .bind(bet.stake)
        .bind(bet.payout_value)
        .bind(bet.profit)
        .bind(bet.result.as_str())
        .bind(bet.is_live)
        .bind(&bet.source)
        .bind(&bet.receipt_image)
        .bind(bet.updated_at.map(format_timestamp))
        .bind(bet.id)
        .execute(&self.pool)
        .await
        .context("Failed to update bet")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a bet; returns false if it does not exist
    pub async fn delete_bet(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete bet")?;

        Ok(result.rows_affected() > 0)
    }

    /// Ids of bets that have no order reference yet
    pub async fn ids_missing_order_id(&self) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM bets WHERE order_id IS NULL ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to find bets without order id")?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Assign order references in a single transaction
    pub async fn set_order_ids(&self, assignments: &[(i64, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin backfill")?;

        for (id, order_id) in assignments {
            sqlx::query("UPDATE bets SET order_id = ? WHERE id = ?")
                .bind(order_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to set order id")?;
        }

        tx.commit().await.context("Failed to commit backfill")?;
        Ok(())
    }

    /// Get count of bets
    pub async fn get_bet_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bets")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bets")?;

        Ok(row.0)
    }
}

const INSERT_BET: &str = r#"
    INSERT INTO bets (
        user_id,
        order_id,
        event,
        market,
        odd,
        stake,
        payout_value,
        profit,
        result,
        is_live,
        source,
        receipt_image,
        created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

fn bind_insert<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    bet: &'q NewBet,
    order_id: &'q str,
    profit: Option<f64>,
    created_at: NaiveDateTime,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&bet.user_id)
        .bind(order_id)
        .bind(&bet.event)
        .bind(&bet.market)
        .bind(bet.odd)
        .bind(bet.stake)
        .bind(bet.payout_value)
        .bind(profit)
        .bind(bet.result.as_str())
        .bind(bet.is_live)
        .bind(&bet.source)
        .bind(&bet.receipt_image)
        .bind(format_timestamp(created_at))
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("Malformed timestamp in database: {s}"))
}

/// Database row representation
#[derive(sqlx::FromRow)]
struct BetRow {
    id: i64,
    user_id: String,
    order_id: Option<String>,
    event: String,
    market: Option<String>,
    odd: f64,
    stake: f64,
    payout_value: Option<f64>,
    profit: Option<f64>,
    result: String,
    is_live: bool,
    source: String,
    receipt_image: Option<String>,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<BetRow> for Bet {
    type Error = anyhow::Error;

    fn try_from(row: BetRow) -> Result<Self> {
        Ok(Bet {
            id: row.id,
            user_id: row.user_id,
            order_id: row.order_id,
            event: row.event,
            market: row.market,
            odd: row.odd,
            stake: row.stake,
            payout_value: row.payout_value,
            profit: row.profit,
            result: BetResult::parse(&row.result)
                .ok_or_else(|| anyhow!("Unknown bet result in database: {}", row.result))?,
            is_live: row.is_live,
            source: row.source,
            receipt_image: row.receipt_image,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: row.updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}
