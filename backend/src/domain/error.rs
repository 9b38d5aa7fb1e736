//! Failure payload returned by every service operation.
//!
//! One error per operation, carrying a stable [`ErrorCode`], a readable
//! message and optional structured details naming the lookup key that
//! failed (an id, an id list, a name or a keyword). No transport status is
//! attached; a request-handling layer chooses its own mapping.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Caller-supplied data failed a precondition.
    InvalidInput,
    /// A lookup by id, name, or derived id set matched nothing.
    NotFound,
    /// A backing store or transport failed.
    Internal,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid input",
            Self::NotFound => "not found",
            Self::Internal => "internal error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected error message.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
}

/// Service error.
///
/// The message is never blank: [`Error::try_new`] rejects blank text and
/// [`Error::new`] substitutes a generic message for the code.
///
/// # Examples
/// ```
/// use scriptorium::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::not_found("author not found").with_details(json!({ "name": "Ada" }));
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(
///     serde_json::to_value(&err).unwrap(),
///     json!({ "code": "not_found", "message": "author not found", "details": { "name": "Ada" } })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error, replacing a blank message with the code's default.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Build an error, rejecting a blank message.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorValidationError::EmptyMessage`] when `message` is empty
    /// once trimmed.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Caller-supplied data failed a precondition.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// A lookup matched nothing.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// A backing store or transport failed.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Attach the lookup key or other structured context.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message; never blank.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context such as the lookup key.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

#[cfg(test)]
mod tests;
