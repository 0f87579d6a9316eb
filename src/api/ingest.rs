use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::AppError;
use crate::ingest::RowError;

/// Acknowledgement returned after a CSV upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub content_type: String,
    pub size_kb: String,
    pub status: String,
    pub rows: usize,
    pub imported: u64,
    pub errors: Vec<RowError>,
}

/// Imports the CSV request body as bets owned by `user_id`.
///
/// # Errors
/// Returns 400 for an empty body or user id.
pub async fn upload_csv(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let size_kb = format!("{:.2}", body.len() as f64 / 1024.0);

    info!(
        "Received upload for user {} ({} KB, {})",
        user_id, size_kb, content_type
    );

    let summary = state.bets.import_csv(&user_id, &body[..]).await?;

    Ok(Json(UploadResponse {
        content_type,
        size_kb,
        status: "received".to_string(),
        rows: summary.rows,
        imported: summary.imported,
        errors: summary.errors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use axum::http::{HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_upload_imports_rows() {
        let state = test_support::state().await;
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        let body = Bytes::from_static(
            b"event,market,odd,stake,payout_value,result\nA x B,1X2,1.5,10,15,win\nC x D,1X2,2,10,,pending\n",
        );

        let Json(response) = upload_csv(State(state.clone()), Path("u1".to_string()), headers, body)
            .await
            .unwrap();

        assert_eq!(response.status, "received");
        assert_eq!(response.content_type, "text/csv");
        assert_eq!(response.rows, 2);
        assert_eq!(response.imported, 2);
        assert!(response.errors.is_empty());

        let bets = state.bets.list(Some("u1")).await.unwrap();
        assert_eq!(bets.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let state = test_support::state().await;

        let err = upload_csv(
            State(state),
            Path("u1".to_string()),
            HeaderMap::new(),
            Bytes::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
