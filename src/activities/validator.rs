//! # Step validation collaborator.
//!
//! [`StepValidator`] is awaited by the session for every `StepCompleted`
//! signal, at most one call in flight per session, bounded by
//! `Config::validation_timeout`. There is no retry:
//!
//! ```text
//! Ok(true)          → completed += 1 (and perfect += 1 if flagged)
//! Ok(false)         → mistakes += 1
//! Err(_) / timeout  → mistakes += 1
//! panic             → session fails (status = failed)
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActivityError;
use crate::order::OrderId;

/// Shared handle to a validator.
pub type ValidatorRef = Arc<dyn StepValidator>;

/// # Decides whether a step reported for an order is valid.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ordervisor::{ActivityError, OrderId, StepValidator};
///
/// struct NoBurnt;
///
/// #[async_trait]
/// impl StepValidator for NoBurnt {
///     async fn validate_step(&self, _order: &OrderId, step: &str) -> Result<bool, ActivityError> {
///         Ok(!step.contains("burnt"))
///     }
/// }
/// ```
#[async_trait]
pub trait StepValidator: Send + Sync + 'static {
    /// Returns whether `step` is valid for `order`.
    async fn validate_step(&self, order: &OrderId, step: &str) -> Result<bool, ActivityError>;
}

/// Accepts every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

#[async_trait]
impl StepValidator for AcceptAll {
    async fn validate_step(&self, order: &OrderId, step: &str) -> Result<bool, ActivityError> {
        tracing::trace!(%order, step, "accepting step");
        Ok(true)
    }
}

/// Function-backed validator.
///
/// Wraps a closure `Fn(OrderId, String) -> Fut`, producing a fresh future per call.
///
/// ## Example
/// ```rust
/// use ordervisor::{ActivityError, OrderId, ValidatorFn, ValidatorRef};
///
/// let v: ValidatorRef = ValidatorFn::arc(|_order: OrderId, step: String| async move {
///     Ok::<_, ActivityError>(step != "Burn")
/// });
/// ```
pub struct ValidatorFn<F> {
    f: F,
}

impl<F> ValidatorFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the validator and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> StepValidator for ValidatorFn<F>
where
    F: Fn(OrderId, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, ActivityError>> + Send + 'static,
{
    async fn validate_step(&self, order: &OrderId, step: &str) -> Result<bool, ActivityError> {
        (self.f)(order.clone(), step.to_string()).await
    }
}
