//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use meeting_ai::Error as MeetingAiError;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error, if any, and `message`
/// the human readable text the caller sees. Lower layers translate into this type with
/// `From` impls so that `?` works across layer boundaries.
///
/// Every error can be reduced to a [`Classification`], which is what the retry executor
/// and callers use to decide between retrying, surfacing, or ignoring a failure.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
    pub message: String,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Kinds of errors that bubble up from the store collaborators (`entity_api`),
/// plus the not-found and invalid-input failures the domain raises itself.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    PermissionDenied,
    ResourceExhausted,
    Aborted,
    Unavailable,
    DeadlineExceeded,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Timeout,
    Unauthenticated,
    RateLimited,
    Other(String),
}

/// Normalized error code shared with callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NetworkError,
    TimeoutError,
    Unavailable,
    Aborted,
    AuthError,
    PermissionDenied,
    ResourceExhausted,
    ValidationError,
    NotFound,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Aborted => "ABORTED",
            ErrorCode::AuthError => "AUTH_ERROR",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Only connectivity and contention failures are worth repeating.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError
                | ErrorCode::TimeoutError
                | ErrorCode::Unavailable
                | ErrorCode::Aborted
        )
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::AuthError | ErrorCode::PermissionDenied => Severity::High,
            ErrorCode::ValidationError | ErrorCode::NotFound => Severity::Low,
            _ => Severity::Medium,
        }
    }

    /// Auth-class failures mean the caller cannot see the data at all.
    pub fn is_auth(&self) -> bool {
        matches!(self, ErrorCode::AuthError | ErrorCode::PermissionDenied)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// The `{message, code, retryable, severity}` view of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub message: String,
    pub code: ErrorCode,
    pub retryable: bool,
    pub severity: Severity,
}

impl Classification {
    fn new(message: String, code: ErrorCode) -> Self {
        Self {
            message,
            retryable: code.is_retryable(),
            severity: code.severity(),
            code,
        }
    }
}

/// Heuristic classification for failures that carry nothing but a message.
pub fn classify_message(message: &str) -> ErrorCode {
    let lower = message.to_lowercase();

    if lower.contains("network") || lower.contains("fetch") {
        ErrorCode::NetworkError
    } else if lower.contains("timeout") {
        ErrorCode::TimeoutError
    } else if lower.contains("permission") {
        ErrorCode::PermissionDenied
    } else if lower.contains("auth") {
        ErrorCode::AuthError
    } else if lower.contains("validation") {
        ErrorCode::ValidationError
    } else {
        ErrorCode::UnknownError
    }
}

impl Error {
    pub fn new(error_kind: DomainErrorKind, message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)),
            message,
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid)),
            message,
        )
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(
            DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::PermissionDenied,
            )),
            message,
        )
    }

    /// An error with no structured kind; it is classified by its message alone.
    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            DomainErrorKind::Internal(InternalErrorKind::Other(message.clone())),
            message,
        )
    }

    /// Structured kinds win; kinds that carry no code fall back to the message.
    pub fn code(&self) -> ErrorCode {
        let structured = match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(kind)) => match kind {
                EntityErrorKind::NotFound => Some(ErrorCode::NotFound),
                EntityErrorKind::Invalid => Some(ErrorCode::ValidationError),
                EntityErrorKind::Unauthenticated => Some(ErrorCode::AuthError),
                EntityErrorKind::PermissionDenied => Some(ErrorCode::PermissionDenied),
                EntityErrorKind::ResourceExhausted => Some(ErrorCode::ResourceExhausted),
                EntityErrorKind::Aborted => Some(ErrorCode::Aborted),
                EntityErrorKind::Unavailable => Some(ErrorCode::Unavailable),
                EntityErrorKind::DeadlineExceeded => Some(ErrorCode::TimeoutError),
                EntityErrorKind::Other(_) => None,
            },
            DomainErrorKind::External(kind) => match kind {
                ExternalErrorKind::Network => Some(ErrorCode::NetworkError),
                ExternalErrorKind::Timeout => Some(ErrorCode::TimeoutError),
                ExternalErrorKind::Unauthenticated => Some(ErrorCode::AuthError),
                ExternalErrorKind::RateLimited => Some(ErrorCode::ResourceExhausted),
                ExternalErrorKind::Other(_) => None,
            },
            DomainErrorKind::Internal(_) => None,
        };

        structured.unwrap_or_else(|| classify_message(&self.message))
    }

    pub fn classification(&self) -> Classification {
        Classification::new(self.message.clone(), self.code())
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error [{}]: {}", self.code(), self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::ValidationError => EntityErrorKind::Invalid,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::PermissionDenied => EntityErrorKind::PermissionDenied,
            EntityApiErrorKind::ResourceExhausted => EntityErrorKind::ResourceExhausted,
            EntityApiErrorKind::Aborted => EntityErrorKind::Aborted,
            EntityApiErrorKind::Unavailable => EntityErrorKind::Unavailable,
            EntityApiErrorKind::DeadlineExceeded => EntityErrorKind::DeadlineExceeded,
            other => EntityErrorKind::Other(other.code().to_string()),
        };

        Error {
            message: err.message(),
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<MeetingAiError> for Error {
    fn from(err: MeetingAiError) -> Self {
        let error_kind = match &err {
            MeetingAiError::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAiError::Timeout(_) => DomainErrorKind::External(ExternalErrorKind::Timeout),
            MeetingAiError::Authentication(_) => {
                DomainErrorKind::External(ExternalErrorKind::Unauthenticated)
            }
            MeetingAiError::RateLimited { .. } => {
                DomainErrorKind::External(ExternalErrorKind::RateLimited)
            }
            MeetingAiError::Configuration(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
            }
            _ => DomainErrorKind::External(ExternalErrorKind::Other(
                "Transcript analysis failed".to_string(),
            )),
        };
        Error {
            message: err.to_string(),
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
