//! Error handling for the camera map console

use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Validation error (empty required field etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend replied with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Push channel error
    #[error("Push channel error: {0}")]
    Channel(#[from] tokio_tungstenite::tungstenite::Error),

    /// Streaming playback error
    #[error("Stream error: {0}")]
    Stream(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Message suitable for a user-facing alert.
    ///
    /// Server-provided messages are passed through; transport failures
    /// collapse to a generic status line so raw connection errors never
    /// reach the user verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Api { message, status } => {
                if message.is_empty() {
                    format!("Server error (HTTP {})", status)
                } else {
                    message.clone()
                }
            }
            Error::Http(e) => {
                if let Some(status) = e.status() {
                    format!("Server error (HTTP {})", status)
                } else {
                    "Could not reach the server".to_string()
                }
            }
            Error::Stream(msg) => msg.clone(),
            _ => "An internal error occurred".to_string(),
        }
    }

    /// JSON shape used when an error is recorded for diagnostics
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.to_string(),
            "message": self.user_message(),
        })
    }
}
