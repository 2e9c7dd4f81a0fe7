//! Error types for the Kiosk MCP server.
//!
//! This module defines `KioskError`, the unified error type used throughout
//! the application for consistent error handling and propagation.
//!
//! # Security
//!
//! Error text shown to MCP callers is passed through `sanitize_message()`
//! so API tokens never leak into tool responses or logs.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all Kiosk operations.
#[derive(Error, Debug)]
pub enum KioskError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The raw response body, usually a Jira error document.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A service-desk-scoped tool had no ID and no configured default.
    #[error("No service_desk_id provided and JIRA_DEFAULT_SERVICE_DESK_ID not set")]
    MissingServiceDesk,

    /// The comma-separated username list was empty after filtering.
    #[error("No valid usernames provided")]
    NoUsernames,

    /// A JSON-string tool parameter could not be parsed into an object.
    #[error("Error parsing {field} JSON: {message}")]
    InvalidJson {
        /// The parameter name, e.g. `custom_fields`.
        field: &'static str,
        /// Parser detail.
        message: String,
    },

    /// A write tool was called while the server runs in read-only mode.
    #[error("Cannot {action} in read-only mode")]
    ReadOnly {
        /// Human-readable description of the blocked action.
        action: &'static str,
    },

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl KioskError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        KioskError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        KioskError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        KioskError::Validation(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        KioskError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates an invalid JSON parameter error.
    pub fn invalid_json(field: &'static str, message: impl std::fmt::Display) -> Self {
        KioskError::InvalidJson {
            field,
            message: message.to_string(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        KioskError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns true if the error was caused by caller input rather than the
    /// remote service or the transport.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KioskError::Validation(_)
                | KioskError::MissingServiceDesk
                | KioskError::NoUsernames
                | KioskError::InvalidJson { .. }
                | KioskError::ReadOnly { .. }
        )
    }

    /// Renders the error as a tool response string.
    ///
    /// - JSON parameter errors are returned as-is (`Error parsing ... JSON: ...`).
    /// - HTTP status errors become `HTTP Error {status}: {body}`, with JSON
    ///   bodies pretty-printed and anything else passed through raw.
    /// - Everything else becomes `Error: {message}`.
    #[must_use]
    pub fn tool_message(&self) -> String {
        match self {
            KioskError::InvalidJson { .. } => self.to_string(),
            KioskError::HttpStatus { status, body } => {
                let details = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|json| serde_json::to_string_pretty(&json).ok())
                    .unwrap_or_else(|| body.clone());
                format!("HTTP Error {}: {}", status.as_u16(), details)
            }
            _ => format!("Error: {}", self),
        }
    }

    /// Sanitizes an error message to remove any occurrence of a secret.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `secret` - The API token to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the secret replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Renders [`tool_message`](Self::tool_message) with the secret redacted.
    #[must_use]
    pub fn sanitized_tool_message(&self, secret: &str) -> String {
        Self::sanitize_message(&self.tool_message(), secret)
    }
}
