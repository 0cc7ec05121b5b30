//! Error types returned by the Spect'App client.

use thiserror::Error;

/// Result alias used across the client.
pub type Result<T, E = SpectAppError> = std::result::Result<T, E>;

/// Coarse classification of a [`SpectAppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum ErrorKind {
    /// The client is misconfigured (no key, bad base URL, HTTP client build failure).
    Configuration,
    /// Network failure or non-2xx HTTP status.
    Transport,
    /// The server answered, but with a failure status or an unusable payload.
    Application,
}

/// Errors returned by [`crate::SpectAppClient`].
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum SpectAppError {
    /// No API key has been set on the client.
    #[error("API key is not set. Use set_key() to set it.")]
    MissingKey,

    /// The endpoint could not be joined onto the configured base URL.
    #[error("invalid URL for endpoint {endpoint}")]
    InvalidUrl {
        /// Endpoint being requested.
        endpoint: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// Request failed at the transport level or returned a non-2xx status.
    #[error("HTTP error on {endpoint}: {source}")]
    Transport {
        /// Endpoint being requested.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Server replied with a non-`success` status.
    #[error("Error while requesting Spect'App API: {message}")]
    Api {
        /// Server-supplied error message.
        message: String,
    },

    /// Server replied with `success` but the payload is unusable.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint being requested.
        endpoint: String,
        /// What was wrong with the payload.
        reason: String,
    },
}

impl SpectAppError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKey | Self::InvalidUrl { .. } | Self::HttpClient(_) => {
                ErrorKind::Configuration
            }
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Api { .. } | Self::InvalidResponse { .. } => ErrorKind::Application,
        }
    }

    pub(crate) fn invalid_response(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint: String::from(endpoint),
            reason: reason.into(),
        }
    }
}
