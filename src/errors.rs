use axum::{Json, http::StatusCode};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of a ledger generation run. Per-record problems are
/// absorbed during ingestion and never show up here.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read purchases from {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("purchases file {path} is not a JSON array: {source}")]
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize loyalty ledger: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write loyalty ledger to {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
