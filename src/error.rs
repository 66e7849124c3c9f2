//! Error types for the OneView client.
//!
//! This module defines `OneViewError`, the unified error type returned by
//! every operation in the crate.
//!
//! Argument errors (`InvalidArgument`, `UnrecognizedUri`, `UnknownObjectType`)
//! are raised before any request leaves the process. Task outcomes are kept
//! apart from each other: a task that ends in an error state surfaces as
//! `TaskFailed` carrying the task's own error payload, while a wait that ran
//! out of budget surfaces as `TaskTimeout`.
//!
//! # Security
//!
//! Messages built from server responses are sanitized so the session id
//! never ends up in logs or error text. Use `sanitize_message()` when
//! constructing error messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Message used when a required resource body is missing or empty.
pub const RESOURCE_NOT_PROVIDED: &str = "resource was not provided";

/// Message used when a filter field name is missing.
pub const INVALID_FIELD: &str = "invalid field was provided";

/// Message used when a resource id or URI is missing.
pub const INVALID_ID: &str = "invalid id was provided";

/// Message used when a representation lacks the `uri` field an operation needs.
pub const UNKNOWN_OBJECT_TYPE: &str = "unknown object type";

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, OneViewError>;

/// Unified error type for all OneView operations.
#[derive(Error, Debug)]
pub enum OneViewError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required argument was empty or absent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A full URI was supplied that does not belong to the resource's base path.
    #[error("unrecognized URI for this resource: {uri}")]
    UnrecognizedUri {
        /// The offending URI.
        uri: String,
    },

    /// A representation lacks the address field the operation needs.
    #[error("{0}")]
    UnknownObjectType(String),

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
        /// The response body, potentially containing error details.
        body: String,
    },

    /// The appliance rejected the session (HTTP 401/403).
    #[error("authentication failed - check ONEVIEW_SESSION_ID")]
    Authentication,

    /// The requested address does not exist on the appliance.
    #[error("resource not found: {uri}")]
    NotFound {
        /// The address that was requested.
        uri: String,
    },

    /// A polled task reached a terminal error state.
    #[error("task {task_uri} ended in state {state}: {message}")]
    TaskFailed {
        /// Address of the failed task.
        task_uri: String,
        /// Terminal state reported by the appliance (e.g. `Error`).
        state: String,
        /// First error message reported by the task.
        message: String,
        /// Error code of the first task error, if any.
        error_code: Option<String>,
        /// Suggested resolutions from the first task error.
        recommended_actions: Vec<String>,
        /// The task's full `taskErrors` payload.
        details: serde_json::Value,
    },

    /// Waiting for a task exceeded the caller's budget.
    ///
    /// The remote operation is not cancelled; only the wait stops.
    #[error("timed out after {waited:?} waiting for task {task_uri}")]
    TaskTimeout {
        /// Address of the task that was still running.
        task_uri: String,
        /// How long we waited.
        waited: Duration,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OneViewError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        OneViewError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        OneViewError::Config(message.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        OneViewError::InvalidArgument(message.into())
    }

    /// Creates an unrecognized URI error.
    pub fn unrecognized_uri(uri: impl Into<String>) -> Self {
        OneViewError::UnrecognizedUri { uri: uri.into() }
    }

    /// Creates an unknown object type error.
    pub fn unknown_object_type() -> Self {
        OneViewError::UnknownObjectType(UNKNOWN_OBJECT_TYPE.to_string())
    }

    /// Creates a not found error for an address.
    pub fn not_found(uri: impl Into<String>) -> Self {
        OneViewError::NotFound { uri: uri.into() }
    }

    /// Creates a task timeout error.
    pub fn task_timeout(task_uri: impl Into<String>, waited: Duration) -> Self {
        OneViewError::TaskTimeout {
            task_uri: task_uri.into(),
            waited,
        }
    }

    /// Returns true if the error was raised locally before any request was sent.
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            OneViewError::InvalidArgument(_)
                | OneViewError::UnrecognizedUri { .. }
                | OneViewError::UnknownObjectType(_)
        )
    }

    /// Returns true if a polled task reported a terminal error state.
    #[must_use]
    pub fn is_task_failure(&self) -> bool {
        matches!(self, OneViewError::TaskFailed { .. })
    }

    /// Returns true if waiting for a task ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, OneViewError::TaskTimeout { .. })
    }

    /// Returns true if an HTTP exchange itself timed out.
    ///
    /// The request may or may not have reached the appliance.
    #[must_use]
    pub fn is_transport_timeout(&self) -> bool {
        matches!(self, OneViewError::Http(e) if e.is_timeout())
    }

    /// Sanitizes an error message to remove any occurrence of the session id.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `session_id` - The session id to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the session id replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, session_id: &str) -> String {
        if session_id.is_empty() {
            return message.to_string();
        }
        message.replace(session_id, "[REDACTED]")
    }
}
