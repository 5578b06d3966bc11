//! Error types for the `backoffice-models` crate.
//!
//! All fallible constructors and validators in this crate return variants
//! of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was missing or blank.
    #[error("missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A value did not match any known variant.
    #[error("unknown {kind} \"{value}\"")]
    UnknownVariant {
        /// What was being parsed (e.g. `login variant`).
        kind: String,
        /// The value that failed to parse.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_missing_field() {
        let err = ModelError::MissingField {
            field: "password".into(),
        };
        assert_eq!(err.to_string(), "missing required field: password");
    }

    #[test]
    fn error_display_unknown_variant() {
        let err = ModelError::UnknownVariant {
            kind: "login variant".into(),
            value: "phone".into(),
        };
        assert_eq!(err.to_string(), "unknown login variant \"phone\"");
    }
}
