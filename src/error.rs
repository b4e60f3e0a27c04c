//! Error hierarchy for the value runtime.
//!
//! A single [`OCError`] enum covers every boundary failure named in
//! `spec.md` §7: bad arguments, type mismatches, allocation failure,
//! and (de)serialization failure. No `Box<dyn Error>`, no `.unwrap()`
//! outside tests.

use thiserror::Error;

/// Errors surfaced at the boundary of the value runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OCError {
    /// A required argument was null, out of range, or otherwise malformed.
    #[error("argument error: {0}")]
    Argument(String),

    /// An operation required a specific concrete type but received another.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type name the operation required.
        expected: String,
        /// The type name that was actually supplied.
        found: String,
    },

    /// A nested element or container could not be built or serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A JSON node did not match the shape a factory requires.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The type registry has reached its maximum number of registered types.
    #[error("type registry is full")]
    RegistryFull,
}

impl OCError {
    /// Build an [`OCError::Argument`] from any displayable reason.
    pub fn argument(reason: impl Into<String>) -> Self {
        OCError::Argument(reason.into())
    }

    /// Build an [`OCError::TypeMismatch`].
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        OCError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build an [`OCError::Serialization`] from any displayable reason.
    pub fn serialization(reason: impl Into<String>) -> Self {
        OCError::Serialization(reason.into())
    }

    /// Build an [`OCError::Deserialization`] from any displayable reason.
    pub fn deserialization(reason: impl Into<String>) -> Self {
        OCError::Deserialization(reason.into())
    }
}
