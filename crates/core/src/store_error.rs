use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories reported by a store adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    /// The store could not be reached or the request failed in flight.
    Transport,
    /// A uniqueness or shape constraint rejected the write.
    Constraint,
    /// The addressed rows do not exist.
    NotFound,
}

impl StoreErrorKind {
    /// Returns a stable label for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Constraint => "constraint",
            Self::NotFound => "not_found",
        }
    }
}

impl Display for StoreErrorKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned by every store adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct StoreError {
    /// Failure category.
    pub kind: StoreErrorKind,
    /// Human readable failure detail.
    pub detail: String,
}

impl StoreError {
    /// Creates a transport failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Transport,
            detail: detail.into(),
        }
    }

    /// Creates a constraint failure.
    #[must_use]
    pub fn constraint(detail: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Constraint,
            detail: detail.into(),
        }
    }

    /// Creates a not-found failure.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::NotFound,
            detail: detail.into(),
        }
    }
}
