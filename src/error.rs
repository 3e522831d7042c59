use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("ABI discovery failed: {0}")]
    AbiDiscovery(String),

    #[error("Unexpected balanceOf response: {0}")]
    ResponseShape(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("Balance unavailable (contract call: {primary}; raw call: {fallback})")]
    BalanceUnavailable { primary: String, fallback: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::AbiDiscovery(_) => (StatusCode::BAD_GATEWAY, "ABI_DISCOVERY_ERROR"),
            AppError::ResponseShape(_) => (StatusCode::BAD_GATEWAY, "RESPONSE_SHAPE_ERROR"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::BlockchainRPC(_) => (StatusCode::BAD_GATEWAY, "BLOCKCHAIN_RPC_ERROR"),
            AppError::BalanceUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, "BALANCE_UNAVAILABLE")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let details = match &self {
            AppError::BalanceUnavailable { primary, fallback } => Some(serde_json::json!({
                "contract_call": primary,
                "raw_call": fallback,
            })),
            _ => None,
        };

        let message = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg,
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
