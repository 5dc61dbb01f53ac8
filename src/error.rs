//! Error types for the semanticizest client.
//!
//! One taxonomy covers both halves of the crate: launching and supervising
//! the worker process, and talking to it over HTTP or stdio. Callers can
//! tell "the service never came up" apart from "the service rejected this
//! request" and pick different retry strategies for each.

use thiserror::Error;

/// Result type alias for semanticizest operations.
pub type Result<T> = std::result::Result<T, SemanticizerError>;

/// Errors that can occur while launching or querying a semanticizest worker.
#[derive(Debug, Error)]
pub enum SemanticizerError {
    /// The worker failed to start or never reported a usable port.
    #[error("failed to launch semanticizest worker: {message}")]
    LaunchFailure {
        /// What went wrong during launch.
        message: String,
        /// Captured worker stderr, when any was produced before the failure.
        stderr: Option<String>,
    },

    /// Connection-level networking failure; the endpoint was never reached.
    #[error("transport error: {0}")]
    TransportFailure(#[source] reqwest::Error),

    /// The endpoint was reachable but returned a non-success status.
    #[error("server returned status {status}: {body}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the server.
        body: String,
    },

    /// The response body did not match the candidate schema.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The operation exceeded its deadline.
    #[error("operation timed out")]
    Timeout,

    /// The operation was aborted by the caller's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O failure on the worker's stdin/stdout or the discovery channel.
    #[error("worker I/O error: {0}")]
    WorkerIo(#[from] std::io::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SemanticizerError {
    /// Create a `LaunchFailure` without captured diagnostics.
    pub fn launch(message: impl Into<String>) -> Self {
        Self::LaunchFailure {
            message: message.into(),
            stderr: None,
        }
    }

    /// Create a `LaunchFailure` carrying captured worker stderr.
    pub fn launch_with_stderr(message: impl Into<String>, stderr: String) -> Self {
        Self::LaunchFailure {
            message: message.into(),
            stderr: if stderr.is_empty() {
                None
            } else {
                Some(stderr)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_message_includes_cause() {
        let err = SemanticizerError::launch("worker exited with status 1");
        assert!(err.to_string().contains("worker exited with status 1"));
    }

    #[test]
    fn launch_with_stderr_drops_empty_capture() {
        let err = SemanticizerError::launch_with_stderr("boom", String::new());
        assert!(matches!(
            err,
            SemanticizerError::LaunchFailure { stderr: None, .. }
        ));
    }

    #[test]
    fn server_error_message_includes_status() {
        let err = SemanticizerError::ServerError {
            status: 500,
            body: "internal error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("internal error"));
    }

    #[test]
    fn timeout_and_cancelled_are_distinct() {
        assert_ne!(
            SemanticizerError::Timeout.to_string(),
            SemanticizerError::Cancelled.to_string()
        );
    }
}
