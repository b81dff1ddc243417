//! Upstream-facing error types.
//!
//! Both error kinds propagate uncaught to the endpoint handlers, which
//! convert them to an HTTP 500 with a human-readable message. There is no
//! retry and no structured error code in the response body.

use http::StatusCode;
use thiserror::Error;

/// Login call failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login request failed with {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("access token not found in login response")]
    TokenMissing,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Authenticated fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed with {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("response body could not be parsed: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Either half of the per-request upstream call pair.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl UpstreamError {
    /// Whether the request itself failed (transport-level or a rejection
    /// status), as opposed to an unusable response body.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::Transport(_) | AuthError::RequestFailed { .. })
                | Self::Fetch(FetchError::Transport(_) | FetchError::RequestFailed { .. })
        )
    }

    /// Diagnostic text for the HTTP 500 body.
    ///
    /// Request failures and response failures get distinct prefixes, but
    /// both stay plain strings.
    pub fn user_message(&self) -> String {
        if self.is_request_failure() {
            format!("API request failed: {self}")
        } else {
            format!("Error: {self}")
        }
    }
}
