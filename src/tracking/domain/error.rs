//! Error types for tracking domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain item values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingDomainError {
    /// A required identifier was empty.
    #[error("{0} identifier must not be empty")]
    EmptyIdentifier(&'static str),

    /// The item title is empty after trimming.
    #[error("item title must not be empty")]
    EmptyTitle,

    /// The update text is empty after trimming.
    #[error("update text must not be empty")]
    EmptyUpdateText,

    /// The due date does not follow `YYYY-MM-DD`.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

/// Error returned while parsing item statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown item status: {0}")]
pub struct ParseItemStatusError(pub String);

/// Error returned while parsing item kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown item kind: {0}")]
pub struct ParseItemKindError(pub String);

/// Error returned while parsing priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority '{0}', expected low, medium, high, or critical")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing creator platforms.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown creator platform: {0}")]
pub struct ParseCreatorPlatformError(pub String);
