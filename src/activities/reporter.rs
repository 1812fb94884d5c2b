//! # Outcome reporting collaborator.
//!
//! [`OutcomeReporter::finish_order`] is invoked exactly once per session,
//! whatever terminal state it reached, bounded by `Config::report_timeout`.
//! A failure is logged and published as `ReportFailed`; the session still retires.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActivityError;
use crate::order::Outcome;

/// Shared handle to a reporter.
pub type ReporterRef = Arc<dyn OutcomeReporter>;

/// Receives the final outcome of each session.
///
/// Must accept `success = false, level = none` for cancelled, timed out and failed sessions.
#[async_trait]
pub trait OutcomeReporter: Send + Sync + 'static {
    async fn finish_order(&self, outcome: &Outcome) -> Result<(), ActivityError>;
}

/// Writes each outcome as a `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

#[async_trait]
impl OutcomeReporter for LogReporter {
    async fn finish_order(&self, outcome: &Outcome) -> Result<(), ActivityError> {
        if outcome.success {
            tracing::info!(
                order = %outcome.order_id,
                level = outcome.level.as_str(),
                completed = outcome.stats.completed_steps,
                total = outcome.stats.total_steps,
                perfect = outcome.stats.perfect_steps,
                mistakes = outcome.stats.mistakes,
                "order finished successfully"
            );
        } else {
            tracing::info!(
                order = %outcome.order_id,
                status = outcome.status.as_str(),
                completed = outcome.stats.completed_steps,
                total = outcome.stats.total_steps,
                "order finished without success"
            );
        }
        Ok(())
    }
}

/// Function-backed reporter wrapping `Fn(Outcome) -> Fut`.
pub struct ReporterFn<F> {
    f: F,
}

impl<F> ReporterFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the reporter and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> OutcomeReporter for ReporterFn<F>
where
    F: Fn(Outcome) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActivityError>> + Send + 'static,
{
    async fn finish_order(&self, outcome: &Outcome) -> Result<(), ActivityError> {
        (self.f)(outcome.clone()).await
    }
}
