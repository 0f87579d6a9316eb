use std::env;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calebet::db::BetStore;
use calebet::service::new_order_id;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backfill_order_ids=info,calebet=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/calebet.db".to_string());

    let store = BetStore::new(&database_url).await?;

    let missing = store.ids_missing_order_id().await?;
    if missing.is_empty() {
        info!("Every bet already has an order id. Nothing to do.");
        return Ok(());
    }

    let assignments: Vec<(i64, String)> = missing
        .into_iter()
        .map(|id| (id, new_order_id()))
        .collect();

    store.set_order_ids(&assignments).await?;

    let total = store.get_bet_count().await?;
    info!(
        "Assigned order ids to {} bets ({} bets in database)",
        assignments.len(),
        total
    );

    Ok(())
}
