// Error responses for the thin HTTP surface. Detailed errors are logged
// server-side only; clients get generic, safe messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::repositories::StoreError;
use crate::services::suppliers::FactoryError;
use crate::services::{RoutingError, SyncError, TranslationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Adapter factory error: {0}")]
    Factory(#[from] FactoryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Store(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            AppError::Routing(RoutingError::Factory(ref err)) => {
                tracing::error!("Routing misconfiguration: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Fulfillment engine misconfigured".to_string(),
                )
            }
            AppError::Routing(err) => {
                tracing::error!("Routing error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Sync(SyncError::SupplierNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Supplier not found".to_string())
            }
            AppError::Sync(SyncError::WebhookRejected(ref reason)) => {
                tracing::warn!("Webhook rejected: {}", reason);
                (StatusCode::BAD_REQUEST, "Webhook rejected".to_string())
            }
            AppError::Sync(err) => {
                tracing::error!("Sync error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Translation(TranslationError::MappingNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Mapping not found".to_string())
            }
            AppError::Translation(err) => {
                tracing::error!("Translation error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Factory(err) => {
                tracing::error!("Adapter factory error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Fulfillment engine misconfigured".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
