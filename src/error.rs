//! Error types for the helpdesk exporter.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (4=argument, 6=remote, 7=config, 8=data)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Batch stages never surface these per ticket; the dispatcher logs them
//! and drops the task from the counts. Only single-call commands
//! (metadata dumps, the first ticket page) let an error end the process.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Argument (exit 4)
    InvalidArgument,

    // Remote (exit 6)
    ApiError,
    HttpError,

    // Config (exit 7)
    ConfigNotFound,
    ConfigError,

    // Data (exit 8)
    InvalidTicket,
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ApiError => "API_ERROR",
            Self::HttpError => "HTTP_ERROR",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InvalidTicket => "INVALID_TICKET",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::InvalidArgument => 4,
            Self::ApiError | Self::HttpError => 6,
            Self::ConfigNotFound | Self::ConfigError => 7,
            Self::InvalidTicket | Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running the same command may succeed.
    ///
    /// Remote failures are transient from the exporter's point of view,
    /// and idempotence makes a re-run cheap.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ApiError | Self::HttpError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while exporting.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config file not found (searched: {})", searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid ticket {}: {message}", path.display())]
    InvalidTicket { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::Http(_) => ErrorCode::HttpError,
            Self::InvalidTicket { .. } => ErrorCode::InvalidTicket,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConfigNotFound { .. } => Some(
                "Pass --config <file> or set HDX_CONFIG. The file needs at least \
                 \"url\", \"token\" and \"export_folder\"."
                    .to_string(),
            ),

            Self::Api { status: 401 | 403, .. } => {
                Some("Check the API token in the config file (or HDX_TOKEN).".to_string())
            }

            Self::Api { status: 429, .. } => Some(
                "The account is rate limited. Lower \"download_threads\" and re-run; \
                 finished files are skipped."
                    .to_string(),
            ),

            Self::Http(e) if e.is_timeout() => Some(
                "The request timed out. Raise \"timeout\" in the config file and re-run."
                    .to_string(),
            ),

            Self::InvalidTicket { .. } => Some(
                "Re-run export-tickets to refresh the ticket file from the server.".to_string(),
            ),

            Self::Config(_)
            | Self::InvalidArgument(_)
            | Self::Api { .. }
            | Self::Http(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Config("bad".into()).exit_code(), 7);
        assert_eq!(Error::InvalidArgument("x".into()).exit_code(), 4);
        assert_eq!(
            Error::Api {
                endpoint: "/users".into(),
                status: 500,
                body: String::new()
            }
            .exit_code(),
            6
        );
        assert_eq!(Error::Other("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_api_error_message_carries_status_and_body() {
        let err = Error::Api {
            endpoint: "/tickets".into(),
            status: 404,
            body: "not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("not found"));
        assert!(msg.contains("/tickets"));
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::Api {
            endpoint: "/users".into(),
            status: 401,
            body: "unauthorized".into(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "API_ERROR");
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["hint"].as_str().unwrap().contains("token"));
    }

    #[test]
    fn test_config_not_found_lists_paths() {
        let err = Error::ConfigNotFound {
            searched: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
        };
        assert!(err.to_string().contains("a.json, b.json"));
        assert!(err.hint().is_some());
    }
}
