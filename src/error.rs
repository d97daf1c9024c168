//! Error types for Rental Desk

use serde::Deserialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The hosted API answered with a non-success status
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body returned by the auth and data endpoints.
///
/// The auth endpoint uses `error_description`/`msg`, the data endpoint uses
/// `message`; whichever is present wins.
#[derive(Debug, Default, Deserialize)]
pub struct RemoteErrorBody {
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl RemoteErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

impl AppError {
    /// Build a remote error from a status code and a raw response body
    pub fn remote(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<RemoteErrorBody>(body)
            .ok()
            .and_then(RemoteErrorBody::into_message)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        AppError::Remote { status, message }
    }

    /// Message suitable for showing to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Remote { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
