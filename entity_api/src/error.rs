//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Errors raised by a persistence or identity collaborator.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex EntityApiErrorKind::RecordNotFound
///  * Errors related to interactions with the store itself. Ex EntityApiErrorKind::Unavailable
#[derive(Debug)]
pub struct Error {
    // Underlying error emitted from the store client, or the store's message
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

/// Error categories, including the document store's own error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityApiErrorKind {
    // Record not found (`not-found`)
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // Caller lacks access to the record (`permission-denied`)
    PermissionDenied,
    // Caller is not signed in (`unauthenticated`)
    RecordUnauthenticated,
    // Quota or rate limit exhausted (`resource-exhausted`)
    ResourceExhausted,
    // Transaction contention (`aborted`)
    Aborted,
    // Store temporarily unreachable (`unavailable`)
    Unavailable,
    // Store deadline passed (`deadline-exceeded`)
    DeadlineExceeded,
    // Validation error (`invalid-argument`, `failed-precondition`)
    ValidationError,
    // Errors related to interactions with the store itself
    SystemError,
    // Other errors
    Other,
}

impl EntityApiErrorKind {
    /// The store's wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            EntityApiErrorKind::RecordNotFound => "not-found",
            EntityApiErrorKind::RecordNotUpdated => "not-updated",
            EntityApiErrorKind::PermissionDenied => "permission-denied",
            EntityApiErrorKind::RecordUnauthenticated => "unauthenticated",
            EntityApiErrorKind::ResourceExhausted => "resource-exhausted",
            EntityApiErrorKind::Aborted => "aborted",
            EntityApiErrorKind::Unavailable => "unavailable",
            EntityApiErrorKind::DeadlineExceeded => "deadline-exceeded",
            EntityApiErrorKind::ValidationError => "invalid-argument",
            EntityApiErrorKind::SystemError => "internal",
            EntityApiErrorKind::Other => "unknown",
        }
    }
}

impl FromStr for EntityApiErrorKind {
    type Err = ();

    /// Parses a store error code. Unrecognized codes map to `Other` rather than failing.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code {
            "not-found" => EntityApiErrorKind::RecordNotFound,
            "permission-denied" => EntityApiErrorKind::PermissionDenied,
            "unauthenticated" => EntityApiErrorKind::RecordUnauthenticated,
            "resource-exhausted" => EntityApiErrorKind::ResourceExhausted,
            "aborted" => EntityApiErrorKind::Aborted,
            "unavailable" => EntityApiErrorKind::Unavailable,
            "deadline-exceeded" => EntityApiErrorKind::DeadlineExceeded,
            "invalid-argument" | "failed-precondition" => EntityApiErrorKind::ValidationError,
            "internal" | "data-loss" => EntityApiErrorKind::SystemError,
            _ => EntityApiErrorKind::Other,
        })
    }
}

impl Error {
    pub fn new(error_kind: EntityApiErrorKind, message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind,
        }
    }

    /// Builds an error from a raw store error code such as `unavailable`.
    pub fn from_code(code: &str, message: &str) -> Self {
        let error_kind = code.parse().unwrap_or(EntityApiErrorKind::Other);
        Self::new(error_kind, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(EntityApiErrorKind::RecordNotFound, message)
    }

    /// The store's message, if the error carries one.
    pub fn message(&self) -> String {
        self.source
            .as_ref()
            .map(|source| source.to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Entity API Error [{}]: {}", self.error_kind.code(), source),
            None => write!(f, "Entity API Error [{}]", self.error_kind.code()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
