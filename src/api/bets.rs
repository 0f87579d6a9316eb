use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;
use crate::models::{Bet, BetUpdate, NewBet};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

/// Lists bets, newest first, optionally for a single user.
pub async fn list_bets(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Bet>>, AppError> {
    let bets = state.bets.list(query.user_id.as_deref()).await?;
    Ok(Json(bets))
}

/// Records a new bet.
///
/// # Errors
/// Returns 400 if the payload fails validation.
pub async fn create_bet(
    State(state): State<AppState>,
    Json(bet): Json<NewBet>,
) -> Result<(StatusCode, Json<Bet>), AppError> {
    let bet = state.bets.create(bet).await?;
    Ok((StatusCode::CREATED, Json(bet)))
}

pub async fn get_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<Json<Bet>, AppError> {
    Ok(Json(state.bets.get(bet_id).await?))
}

/// Applies a partial update to a bet.
///
/// # Errors
/// Returns 404 if the bet doesn't exist, or 400 if a changed field is invalid.
pub async fn update_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
    Json(changes): Json<BetUpdate>,
) -> Result<Json<Bet>, AppError> {
    Ok(Json(state.bets.update(bet_id, changes).await?))
}

pub async fn delete_bet(
    State(state): State<AppState>,
    Path(bet_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.bets.delete(bet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::models::BetResult;

    fn payload(user_id: &str) -> NewBet {
        serde_json::from_value(serde_json::json!({
            "user_id": user_id,
            "event": "Corinthians x Santos",
            "market": "1X2",
            "odd": 2.2,
            "stake": 25.0
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_crud_flow() {
        let state = test_support::state().await;

        let (status, Json(created)) = create_bet(State(state.clone()), Json(payload("u1")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.result, BetResult::Pending);

        let Json(fetched) = get_bet(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(fetched, created);

        let changes = BetUpdate {
            result: Some(BetResult::Win),
            payout_value: Some(55.0),
            ..Default::default()
        };
        let Json(updated) = update_bet(State(state.clone()), Path(created.id), Json(changes))
            .await
            .unwrap();
        assert_eq!(updated.profit, Some(30.0));

        let status = delete_bet(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_bet(State(state), Path(created.id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let state = test_support::state().await;
        let (status, _) = create_bet(State(state.clone()), Json(payload("u1"))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = create_bet(State(state.clone()), Json(payload("u2"))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(all) = list_bets(State(state.clone()), Query(ListQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let query = ListQuery {
            user_id: Some("u2".to_string()),
        };
        let Json(mine) = list_bets(State(state), Query(query)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "u2");
    }

    #[tokio::test]
    async fn test_create_invalid_is_bad_request() {
        let state = test_support::state().await;
        let mut bet = payload("u1");
        bet.odd = 0.0;

        let err = create_bet(State(state), Json(bet)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
