//! # Run a single bounded validation of a step.
//!
//! - **Execute ONE call** of the validator (no retry)
//! - **Apply timeout**: an expired call is abandoned and reported as
//!   [`ActivityError::Timeout`]
//!
//! ## Flow
//! ```text
//! Ok(true)   → StepResult { accepted: Ok(true) }
//! Ok(false)  → StepResult { accepted: Ok(false) }
//! Err(e)     → StepResult { accepted: Err(e) }
//! timeout    → StepResult { accepted: Err(Timeout) }
//! ```
//!
//! The returned future is `'static` so the session can keep it in flight while
//! it goes on reading its inbox.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::time;

use crate::activities::{StepValidator, ValidatorRef};
use crate::error::ActivityError;
use crate::order::OrderId;

/// A `StepCompleted` signal waiting for (or undergoing) validation.
#[derive(Clone, Debug)]
pub(crate) struct PendingStep {
    pub step: String,
    pub perfect: bool,
}

/// Result of one validation call.
#[derive(Debug)]
pub(crate) struct StepResult {
    pub pending: PendingStep,
    pub accepted: Result<bool, ActivityError>,
}

/// Calls `validator` once with an optional bound (`0s` = unbounded).
pub(crate) async fn validate_once<V: StepValidator + ?Sized>(
    validator: &V,
    order: &OrderId,
    step: &str,
    timeout: Duration,
) -> Result<bool, ActivityError> {
    if timeout == Duration::ZERO {
        return validator.validate_step(order, step).await;
    }
    match time::timeout(timeout, validator.validate_step(order, step)).await {
        Ok(res) => res,
        Err(_elapsed) => Err(ActivityError::Timeout { timeout }),
    }
}

/// Builds an owned in-flight validation future for `pending`.
pub(crate) fn spawn_validation(
    validator: ValidatorRef,
    order: OrderId,
    pending: PendingStep,
    timeout: Duration,
) -> BoxFuture<'static, StepResult> {
    async move {
        let accepted = validate_once(validator.as_ref(), &order, &pending.step, timeout).await;
        StepResult { pending, accepted }
    }
    .boxed()
}
