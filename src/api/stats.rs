use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::AppState;
use crate::error::AppError;
use crate::models::BetStats;
use crate::service::StatsQuery;

/// Performance report for a user.
///
/// # Errors
/// Returns 400 for unparseable dates and 404 when the user has no bets in the period.
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<BetStats>, AppError> {
    Ok(Json(state.bets.stats(&user_id, &query).await?))
}
