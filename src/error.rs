use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::stats::{DateRangeError, StatsError};

/// Application error types surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid request data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unparseable date filter
    #[error(transparent)]
    InvalidDate(#[from] DateRangeError),

    /// Requested record or data set does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage or other infrastructure failure
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// JSON body returned for every error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidDate(_) => "invalid_date",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::NoBets => {
                AppError::NotFound("No bets found for this user and period".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidDate(err) => err.to_string(),
            AppError::Internal(err) => {
                error!("Request failed: {:#}", err);
                "internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Validation functions
pub fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn validate_odd(odd: f64) -> Result<(), AppError> {
    if !odd.is_finite() || odd <= 0.0 {
        return Err(AppError::Validation(format!(
            "Odd must be greater than zero, got {}",
            odd
        )));
    }
    Ok(())
}

pub fn validate_stake(stake: f64) -> Result<(), AppError> {
    if !stake.is_finite() || stake <= 0.0 {
        return Err(AppError::Validation(format!(
            "Stake must be greater than zero, got {}",
            stake
        )));
    }
    Ok(())
}

pub fn validate_payout(payout_value: Option<f64>) -> Result<(), AppError> {
    match payout_value {
        Some(payout) if !payout.is_finite() || payout < 0.0 => Err(AppError::Validation(
            format!("Payout value must be non-negative, got {}", payout),
        )),
        _ => Ok(()),
    }
}
