//! Unit tests for quire error types.
//!
//! Tests verify:
//! - Error variant creation
//! - Display formatting
//! - Clone and `PartialEq` derives
//! - Helper methods
//! - Conversions from io and config errors

use quire::{FormConfig, FormError, Result};
use std::error::Error as StdError;

mod creation_tests {
    use super::*;

    #[test]
    fn test_user_aborted_variant() {
        let e = FormError::UserAborted;
        assert!(matches!(e, FormError::UserAborted));
    }

    #[test]
    fn test_limit_exceeded_variant() {
        let e = FormError::LimitExceeded(2);
        assert!(matches!(e, FormError::LimitExceeded(2)));
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(
            FormError::validation("bad"),
            FormError::Validation("bad".into())
        );
        assert_eq!(FormError::io("closed"), FormError::Io("closed".into()));
        assert_eq!(
            FormError::structure("empty"),
            FormError::Structure("empty".into())
        );
    }
}

mod display_tests {
    use super::*;

    #[test]
    fn test_user_aborted_display() {
        assert_eq!(FormError::UserAborted.to_string(), "user aborted");
    }

    #[test]
    fn test_validation_display() {
        let e = FormError::Validation("email must contain @".into());
        assert_eq!(e.to_string(), "validation error: email must contain @");
    }

    #[test]
    fn test_limit_display() {
        let e = FormError::LimitExceeded(3);
        assert_eq!(e.to_string(), "you can't select more than 3 options");
    }

    #[test]
    fn test_structure_display() {
        let e = FormError::structure("form has no groups");
        assert_eq!(e.to_string(), "invalid form structure: form has no groups");
    }
}

mod helper_tests {
    use super::*;

    #[test]
    fn test_is_user_abort() {
        assert!(FormError::UserAborted.is_user_abort());
        assert!(!FormError::LimitExceeded(1).is_user_abort());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(FormError::validation("x").is_recoverable());
        assert!(FormError::LimitExceeded(1).is_recoverable());
        assert!(!FormError::UserAborted.is_recoverable());
        assert!(!FormError::io("x").is_recoverable());
        assert!(!FormError::structure("x").is_recoverable());
    }
}

mod conversion_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let e: FormError = io.into();
        assert!(matches!(e, FormError::Io(ref m) if m.contains("pipe closed")));
    }

    #[test]
    fn test_config_parse_error() {
        let e = FormConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(e, FormError::Config(_)));
        assert!(e.to_string().starts_with("config error:"));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn inner() -> Result<()> {
            Err(std::io::Error::other("boom"))?;
            Ok(())
        }
        assert!(matches!(inner(), Err(FormError::Io(_))));
    }
}

mod trait_tests {
    use super::*;

    #[test]
    fn test_clone_and_eq() {
        let e = FormError::LimitExceeded(2);
        assert_eq!(e.clone(), e);
        assert_ne!(e, FormError::LimitExceeded(3));
    }

    #[test]
    fn test_std_error() {
        let e = FormError::UserAborted;
        let dyn_err: &dyn StdError = &e;
        assert!(dyn_err.source().is_none());
    }
}
