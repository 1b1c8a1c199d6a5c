//! Repository error taxonomy.
//!
//! These errors are transport agnostic. An inbound adapter decides how each
//! variant is presented; the repository only guarantees that permanent
//! conditions are never retried and never folded into a generic failure.
//!
//! ## Propagation
//! - `InputInvalid`, `Duplicate`, and `NotFound` are returned as soon as they
//!   occur. The two permanent kinds carry the store error unchanged.
//! - `RetriesExhausted` wraps the last transient store error.
//! - `ReferenceUnresolved` wraps the failed resolution step of a composite
//!   operation and names which reference could not be found.

use std::fmt;

use thiserror::Error;

use super::ports::StoreError;
use super::venue::LookupKey;

/// Reference resolved by a composite operation before it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    /// A venue referenced by id or name.
    Venue,
    /// A venue list referenced by id or name.
    VenueList,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Venue => f.write_str("venue"),
            Self::VenueList => f.write_str("venue list"),
        }
    }
}

/// Failure of a repository operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The caller omitted a required field; no transaction was opened.
    #[error("invalid input: {message}")]
    InputInvalid { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("{operation}: duplicate entry")]
    Duplicate {
        operation: &'static str,
        source: StoreError,
    },
    /// A lookup that required exactly one row matched none.
    #[error("{operation}: no matching records found")]
    NotFound {
        operation: &'static str,
        source: StoreError,
    },
    /// Transient failures outlasted the retry budget.
    #[error("{operation}: maximum number of retries exceeded after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        source: StoreError,
    },
    /// A composite operation could not resolve one of its references.
    #[error("{reference} {key} not found")]
    ReferenceUnresolved {
        reference: Reference,
        key: LookupKey,
        source: Box<RepositoryError>,
    },
}

impl RepositoryError {
    /// Convenience constructor for [`RepositoryError::InputInvalid`].
    pub fn input_invalid(message: impl Into<String>) -> Self {
        Self::InputInvalid {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`RepositoryError::Duplicate`].
    pub fn duplicate(operation: &'static str, source: StoreError) -> Self {
        Self::Duplicate { operation, source }
    }

    /// Convenience constructor for [`RepositoryError::NotFound`].
    pub fn not_found(operation: &'static str, source: StoreError) -> Self {
        Self::NotFound { operation, source }
    }

    /// Convenience constructor for [`RepositoryError::RetriesExhausted`].
    pub fn retries_exhausted(operation: &'static str, attempts: u32, source: StoreError) -> Self {
        Self::RetriesExhausted {
            operation,
            attempts,
            source,
        }
    }

    /// Convenience constructor for [`RepositoryError::ReferenceUnresolved`].
    pub fn reference_unresolved(reference: Reference, key: LookupKey, source: Self) -> Self {
        Self::ReferenceUnresolved {
            reference,
            key,
            source: Box::new(source),
        }
    }

    /// Whether retrying the same call can never succeed.
    ///
    /// Only [`RepositoryError::RetriesExhausted`] describes a condition that
    /// may clear on its own.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, Self::RetriesExhausted { .. })
    }
}

#[cfg(test)]
mod tests;
