//! Error types for the account client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("File too large: {size} bytes (max {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("API returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    ApiError { status: u16, message: Option<String> },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClientError {
    /// The `error` text supplied by the server, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::ApiError { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_only_for_api_errors() {
        let err = ClientError::ApiError {
            status: 400,
            message: Some("User already exists".to_string()),
        };
        assert_eq!(err.server_message(), Some("User already exists"));
        assert_eq!(err.to_string(), "API returned 400: User already exists");

        let bare = ClientError::ApiError { status: 500, message: None };
        assert_eq!(bare.server_message(), None);
        let io = ClientError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert!(io.server_message().is_none());
    }
}
