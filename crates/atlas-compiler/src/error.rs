//! Error taxonomy for compilation and execution.
//!
//! Every operation in this crate is a pure, total computation over a finite
//! domain, so there is nothing to retry: an error always means a malformed
//! descriptor or input, or a defect in the compiler itself.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`Error::Validation`] | descriptor checks, input checks, range checks |
//! | [`Error::BackendInvariant`] | a backend receiving IR it must never see |
//! | [`Error::ArithmeticDomain`] | inverting non-units, projecting non-rank-1 elements |
//! | [`Error::Config`] | malformed selector policy files |
//! | [`Error::Descriptor`] | malformed JSON descriptors or inputs |

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor field, input value, class index or grade is malformed.
    #[error("validation failed for `{field}`: {reason}")]
    Validation {
        /// The offending field (dotted path for nested fields).
        field: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The selector routed IR to a backend that cannot execute it.
    #[error("backend invariant violated: {reason}")]
    BackendInvariant {
        /// What the backend encountered.
        reason: String,
    },

    /// An algebraic operation was applied outside its domain.
    #[error("arithmetic domain error: {reason}")]
    ArithmeticDomain {
        /// What was attempted.
        reason: String,
    },

    /// The compiler configuration could not be parsed.
    #[error("invalid compiler configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A descriptor or input document could not be parsed.
    #[error("invalid descriptor document: {0}")]
    Descriptor(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a [`Error::Validation`] for `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`Error::BackendInvariant`].
    pub fn backend_invariant(reason: impl Into<String>) -> Self {
        Self::BackendInvariant {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::ArithmeticDomain`].
    pub fn arithmetic_domain(reason: impl Into<String>) -> Self {
        Self::ArithmeticDomain {
            reason: reason.into(),
        }
    }

    /// True for [`Error::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True for [`Error::BackendInvariant`].
    pub fn is_backend_invariant(&self) -> bool {
        matches!(self, Self::BackendInvariant { .. })
    }

    /// True for [`Error::ArithmeticDomain`].
    pub fn is_arithmetic_domain(&self) -> bool {
        matches!(self, Self::ArithmeticDomain { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_names_field() {
        let err = Error::validation("runtime.a", "class index 96 out of range");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "validation failed for `runtime.a`: class index 96 out of range"
        );
    }

    #[test]
    fn test_kind_predicates() {
        assert!(Error::backend_invariant("project reached class backend").is_backend_invariant());
        assert!(Error::arithmetic_domain("not a pure power").is_arithmetic_domain());
        assert!(!Error::arithmetic_domain("x").is_validation());
    }
}
