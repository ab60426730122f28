#![forbid(unsafe_code)]

//! Error types.
//!
//! Only API misuse is an error. Anomalies during normal operation (unknown
//! kinds, duplicate identities, closing unknown ids, suppressed admission)
//! have defined non-error outcomes instead.

use thiserror::Error;

use crate::request::ModalId;

/// Rejected submission. The scheduler state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The request kind is empty or whitespace.
    #[error("modal request kind must not be empty")]
    EmptyKind,

    /// An explicit identity key was empty.
    #[error("modal identity key must not be empty")]
    EmptyIdentityKey,

    /// A caller-supplied id is already queued or shown.
    #[error("{0} is already queued or shown")]
    DuplicateId(ModalId),
}

/// Invalid scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A policy file could not be parsed.
    #[error("policy parse error: {0}")]
    Parse(String),

    /// Values are individually fine but unusable together.
    #[error("invalid scheduler config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            SubmitError::DuplicateId(ModalId::new(3)).to_string(),
            "modal#3 is already queued or shown"
        );
        assert_eq!(
            SubmitError::EmptyKind.to_string(),
            "modal request kind must not be empty"
        );
        assert_eq!(
            ConfigError::Invalid("x".into()).to_string(),
            "invalid scheduler config: x"
        );
    }
}
