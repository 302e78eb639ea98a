//! Gateway error types
//!
//! Errors are split into transient and permanent at this boundary so
//! the sync coordinator can dead-letter permanently rejected actions
//! instead of retrying them forever.

use thiserror::Error;

/// Errors that can occur talking to the remote service
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, timeout or body-transfer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body could not be decoded, or a queued payload
    /// could not be re-encoded for dispatch
    #[error("Decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether retrying this error is pointless.
    ///
    /// Server-side failures (5xx), timeouts (408) and throttling (429)
    /// are worth retrying; any other 4xx is a rejection of the request
    /// itself, and a malformed payload will never decode differently.
    pub fn is_permanent(&self) -> bool {
        match self {
            GatewayError::Transport(_) => false,
            GatewayError::Http { status, .. } => match status {
                408 | 429 => false,
                400..=499 => true,
                _ => false,
            },
            GatewayError::Decode(_) => true,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
