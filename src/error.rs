//! Error types used by the ordervisor runtime and its collaborators.
//!
//! This module defines three error enums:
//!
//! - [`OrderError`] - errors returned synchronously to callers of the router.
//! - [`ActivityError`] - errors raised by external collaborators (validator, reporter).
//! - [`RuntimeError`] - errors raised by the runtime itself (shutdown).
//!
//! All of them provide `as_label` (stable snake_case for logs/metrics) and `as_message`.

use std::time::Duration;
use thiserror::Error;

use crate::order::OrderId;

/// # Errors returned to callers of the [`SignalRouter`](crate::SignalRouter).
///
/// None of these is fatal to the runtime or to other sessions.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// No live session with this id (never created or already retired).
    #[error("order {id} not found")]
    NotFound {
        /// The requested order id.
        id: OrderId,
    },

    /// A live session already uses this id.
    #[error("order {id} already exists")]
    DuplicateOrder {
        /// The colliding order id.
        id: OrderId,
    },

    /// An order must have at least one step.
    #[error("order has no steps")]
    EmptySteps,

    /// The registry is draining and no longer accepts new orders.
    #[error("runtime is shutting down; new orders are rejected")]
    ShuttingDown,

    /// A difficulty string did not name a known level.
    #[error("unknown difficulty {value:?} (expected easy, normal or hard)")]
    InvalidDifficulty {
        /// The rejected input.
        value: String,
    },

    /// The session went away without publishing an outcome.
    #[error("order {id} closed without an outcome")]
    Closed {
        /// The order id.
        id: OrderId,
    },
}

impl OrderError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use ordervisor::OrderError;
    ///
    /// assert_eq!(OrderError::EmptySteps.as_label(), "order_empty_steps");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "order_not_found",
            OrderError::DuplicateOrder { .. } => "order_duplicate",
            OrderError::EmptySteps => "order_empty_steps",
            OrderError::ShuttingDown => "order_shutting_down",
            OrderError::InvalidDifficulty { .. } => "order_invalid_difficulty",
            OrderError::Closed { .. } => "order_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            OrderError::NotFound { id } => format!("not found: {id}"),
            OrderError::DuplicateOrder { id } => format!("duplicate: {id}"),
            OrderError::EmptySteps => "no steps".to_string(),
            OrderError::ShuttingDown => "shutting down".to_string(),
            OrderError::InvalidDifficulty { value } => format!("invalid difficulty: {value}"),
            OrderError::Closed { id } => format!("closed without outcome: {id}"),
        }
    }
}

/// # Errors produced by external collaborators.
///
/// The session never propagates these to callers: a failed or timed out
/// validation counts as a mistake, a failed report is logged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// The call did not finish within its bound.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The collaborator reported a failure.
    #[error("activity failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl ActivityError {
    /// Convenience constructor for [`ActivityError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ActivityError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use ordervisor::ActivityError;
    /// use std::time::Duration;
    ///
    /// let err = ActivityError::Timeout { timeout: Duration::from_secs(60) };
    /// assert_eq!(err.as_label(), "activity_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivityError::Timeout { .. } => "activity_timeout",
            ActivityError::Fail { .. } => "activity_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActivityError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ActivityError::Fail { error } => format!("error: {error}"),
        }
    }
}

/// # Errors produced by the ordervisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; remaining sessions were cancelled.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; cancelling sessions")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Order ids still live when the grace period ran out.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck orders={stuck:?}")
            }
        }
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
