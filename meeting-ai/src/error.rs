//! Error types for transcript analysis.

use std::fmt;

/// Provider-agnostic error for transcript analysis.
///
/// Provider implementations map their native failures onto these variants so that
/// callers can classify them (retry, surface to the user, or give up) without knowing
/// which LLM vendor is behind the trait.
#[derive(Debug)]
pub enum Error {
    /// API key rejected, expired, or missing the analysis scope.
    Authentication(String),

    /// Connectivity failure talking to the provider. Usually transient.
    Network(String),

    /// Invalid request parameters, e.g. an empty transcript.
    Configuration(String),

    /// Provider refused or failed the request (content policy, model overloaded).
    Provider(String),

    /// The provider did not answer within its deadline.
    Timeout(String),

    /// Requested model or resource does not exist.
    NotFound(String),

    /// Provider rate limit exceeded; wait `retry_after_seconds` before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// The request body could not be serialized.
    Serialization(String),

    /// The model returned analysis JSON that does not match the expected shape.
    Deserialization(String),

    /// Anything else.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout(_) | Error::RateLimited { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
