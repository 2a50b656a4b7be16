//! Core domain types for Silently.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ids;
mod settings;

pub use ids::DeferredId;
pub use settings::{OrphanPolicy, OrphanPolicyParseError};

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Failures
// ============================================================================

/// A failure raised by a computation.
///
/// Cloneable so that a failure stored on a deferred computation can be handed
/// to every observer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Failure {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("computation panicked: {0}")]
    Panicked(String),
    #[error("computation was abandoned before it resolved")]
    Abandoned,
}

impl Failure {
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Convert a caught panic payload into a failure.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked(message)
    }

    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidOperation(_) => FailureKind::InvalidOperation,
            Self::InvalidArgument(_) => FailureKind::InvalidArgument,
            Self::Panicked(_) => FailureKind::Panicked,
            Self::Abandoned => FailureKind::Abandoned,
        }
    }
}

/// Discriminant of [`Failure`], used where only the category matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidOperation,
    InvalidArgument,
    Panicked,
    Abandoned,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidOperation => "invalid_operation",
            Self::InvalidArgument => "invalid_argument",
            Self::Panicked => "panicked",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Terminal result of a computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Succeeded(T),
    Failed(Failure),
}

impl<T> Outcome<T> {
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(failure) => Err(failure),
        }
    }

    #[must_use]
    pub const fn state(&self) -> DeferredState {
        match self {
            Self::Succeeded(_) => DeferredState::Succeeded,
            Self::Failed(_) => DeferredState::Failed,
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            Err(failure) => Self::Failed(failure),
        }
    }
}

/// Lifecycle state of a deferred computation.
///
/// Transitions happen at most once: `Pending -> Succeeded` or `Pending -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredState {
    Pending,
    Succeeded,
    Failed,
}

impl DeferredState {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// ============================================================================
// Suppression
// ============================================================================

/// What a suppressing runner saw.
///
/// `Returned` only means the part of the computation the runner could observe
/// finished normally. For a deferred computation that is the launch phase, so
/// a `Returned` deferred may still fail later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Silenced<T> {
    Returned(T),
    Suppressed { fallback: T, failure: Failure },
}

impl<T> Silenced<T> {
    #[must_use]
    pub const fn was_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed { .. })
    }

    #[must_use]
    pub fn suppressed_failure(&self) -> Option<&Failure> {
        match self {
            Self::Returned(_) => None,
            Self::Suppressed { failure, .. } => Some(failure),
        }
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Returned(value) | Self::Suppressed { fallback: value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Returned(value) | Self::Suppressed { fallback: value, .. } => value,
        }
    }
}
