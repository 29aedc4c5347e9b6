//! Shared primitives for all Rust crates in Rolegrid.

#![forbid(unsafe_code)]

/// Store adapter failure primitives shared across layers.
pub mod store_error;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store_error::{StoreError, StoreErrorKind};

/// Result type used across Rolegrid crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
///
/// Surrounding whitespace is removed on construction so stored names never
/// differ from each other only by padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated, trimmed, non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Reconciliation that stopped after the old junction rows were removed.
///
/// `pending_ids` lists the desired members whose rows were not confirmed as
/// inserted. Re-running the same reconciliation with the same desired set is
/// always safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialWrite {
    /// Junction relation being reconciled, for example `role_permissions`.
    pub relation: String,
    /// Identifier of the role or user that owns the relation rows.
    pub owner_id: String,
    /// Desired member ids not confirmed as stored.
    pub pending_ids: Vec<String>,
    /// Store failure that interrupted the write.
    pub detail: String,
}

impl Display for PartialWrite {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} for '{}' interrupted with {} pending member(s): {}",
            self.relation,
            self.owner_id,
            self.pending_ids.len(),
            self.detail
        )
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Reconciliation was interrupted between its delete and insert steps.
    #[error("partial write: {0}")]
    PartialWrite(PartialWrite),

    /// The backing store failed to serve the request.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
