//! Error handling for the api module

use crate::logging::LogLevel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The response body was not the JSON shape the endpoint promises.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// An error occurred while processing the request.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The endpoint needs a session and none has been saved.
    #[error("Not logged in. Run `insights login` first")]
    NotLoggedIn,
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        ApiError::Http { status, message }
    }

    /// Classify the error to pick the level it is reported at.
    pub fn log_level(&self) -> LogLevel {
        match self {
            // Rate limiting - low priority
            ApiError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Authentication errors - critical
            ApiError::Http { status, .. } if *status == 401 || *status == 403 => LogLevel::Error,
            ApiError::NotLoggedIn => LogLevel::Error,

            // Network issues - usually temporary
            ApiError::Reqwest(_) => LogLevel::Warn,

            _ => LogLevel::Warn,
        }
    }

    /// The server's own explanation, when the error body is a JSON object with a `message`.
    pub fn to_pretty(&self) -> Option<String> {
        match self {
            ApiError::Http { status, message } => {
                let body: serde_json::Value = serde_json::from_str(message).ok()?;
                let text = body.get("message")?.as_str()?;
                Some(format!("[{}] {}", status, text))
            }
            _ => None,
        }
    }
}
