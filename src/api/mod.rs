pub mod bets;
pub mod ingest;
pub mod stats;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::BetService;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub bets: BetService,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// Build the HTTP router with CORS restricted to `cors_origins`
pub fn router(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/", get(health_check))
        .route("/bets", get(bets::list_bets).post(bets::create_bet))
        .route(
            "/bets/:bet_id",
            get(bets::get_bet)
                .put(bets::update_bet)
                .patch(bets::update_bet)
                .delete(bets::delete_bet),
        )
        .route("/ingest/upload/:user_id", post(ingest::upload_csv))
        .route("/stats/:user_id", get(stats::get_user_stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_router_builds_with_default_origins() {
        let state = test_support::state().await;
        let origins = vec![
            "http://localhost".to_string(),
            "http://localhost:3000".to_string(),
        ];
        assert!(router(state, &origins).is_ok());
    }

    #[tokio::test]
    async fn test_router_rejects_bad_origin() {
        let state = test_support::state().await;
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(router(state, &origins).is_err());
    }
}
