use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Input(String),

    #[error("Survey is not active")]
    NotActive,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    /// The message is logged where the error is raised, never sent.
    #[error("Internal server error")]
    Internal(&'static str),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        AppError::Input(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) | AppError::NotActive => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub trait ResultExt<T> {
    /// Log the error and answer with a 500.
    fn reject(self, message: &'static str) -> Result<T, AppError>;

    /// Log the error and answer with a 400 carrying `message`.
    fn reject_input(self, message: &'static str) -> Result<T, AppError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn reject(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            AppError::Internal(message)
        })
    }

    fn reject_input(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            AppError::Input(message.to_string())
        })
    }
}
