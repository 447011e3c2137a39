//! Error types for form construction and execution.

use thiserror::Error;

/// Errors that can occur while building or running a form.
///
/// Interactive validation failures and rejected selections are part of the
/// rendered state and never leave [`Model::update`](crate::Model::update).
/// The variants below are what surfaces through fallible entry points such
/// as [`Form::check`](crate::Form::check),
/// [`Form::run_accessible`](crate::Form::run_accessible) and
/// [`MultiSelect::toggle_select`](crate::MultiSelect::toggle_select).
///
/// # Recovery Strategies
///
/// | Error Variant | Recovery Strategy |
/// |--------------|-------------------|
/// | [`UserAborted`](FormError::UserAborted) | Normal exit, not an error condition |
/// | [`Validation`](FormError::Validation) | Show error message, allow retry |
/// | [`LimitExceeded`](FormError::LimitExceeded) | Deselect something first |
/// | [`Io`](FormError::Io) | Check terminal, fall back to defaults |
/// | [`Config`](FormError::Config) | Fix the configuration file |
/// | [`Structure`](FormError::Structure) | Programming error, fix the form definition |
///
/// # Note on Clone and PartialEq
///
/// This error type implements `Clone` and `PartialEq` to support
/// testing and comparison. As a result, the `Io` and `Config` variants
/// store a `String` message rather than the underlying error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// User aborted the form with Ctrl+C, or input ended in accessible mode.
    ///
    /// This is not an error condition but a normal exit path.
    #[error("user aborted")]
    UserAborted,

    /// A field's validation function rejected its value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A multi-select already holds the maximum number of selections.
    ///
    /// Transient: the rejected toggle left the selection untouched.
    #[error("you can't select more than {0} options")]
    LimitExceeded(usize),

    /// IO error while prompting in accessible mode.
    #[error("io error: {0}")]
    Io(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The form was assembled incorrectly (no groups, empty group,
    /// duplicate keys).
    #[error("invalid form structure: {0}")]
    Structure(String),
}

impl FormError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error with the given message.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates a structural error with the given message.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Returns true if this is a user-initiated abort.
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserAborted)
    }

    /// Returns true if the user can recover from this error by changing
    /// their input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::LimitExceeded(_))
    }
}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized [`Result`] type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(FormError::UserAborted.to_string(), "user aborted");
        assert_eq!(
            FormError::validation("required").to_string(),
            "validation error: required"
        );
        assert_eq!(
            FormError::LimitExceeded(2).to_string(),
            "you can't select more than 2 options"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(FormError::UserAborted.is_user_abort());
        assert!(!FormError::UserAborted.is_recoverable());
        assert!(FormError::LimitExceeded(1).is_recoverable());
        assert!(FormError::validation("x").is_recoverable());
        assert!(!FormError::structure("empty").is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let err: FormError = std::io::Error::other("closed").into();
        assert_eq!(err, FormError::Io("closed".to_string()));
    }
}
