//! # LogWriter: structured event logger
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO order started order="table-4" difficulty=hard budget_ms=24000
//! INFO step validated order="table-4" step="Chop" completed=1
//! WARN step rejected order="table-4" step="Mix" reason="activity failed: no"
//! INFO order finished order="table-4" status=completed level=good
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let order = e.order.as_deref().unwrap_or("-");
        let step = e.step.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let completed = e.stats.map(|s| s.completed_steps);

        match e.kind {
            EventKind::OrderCreated => {
                tracing::debug!(order, difficulty = ?e.difficulty, "order created");
            }
            EventKind::OrderStarted => {
                tracing::info!(order, difficulty = ?e.difficulty, budget_ms = ?e.budget_ms, "order started");
            }
            EventKind::DifficultyChanged => {
                tracing::info!(order, difficulty = ?e.difficulty, status = ?e.status, "difficulty changed");
            }
            EventKind::SignalIgnored => {
                tracing::debug!(order, status = ?e.status, signal = reason, "signal ignored");
            }
            EventKind::StepValidated => {
                tracing::info!(order, step, completed = ?completed, "step validated");
            }
            EventKind::StepRejected => {
                tracing::warn!(order, step, reason, "step rejected");
            }
            EventKind::OrderFinished => {
                tracing::info!(order, status = ?e.status, level = ?e.level, stats = ?e.stats, "order finished");
            }
            EventKind::OutcomeReported => {
                tracing::debug!(order, level = ?e.level, "outcome reported");
            }
            EventKind::ReportFailed => {
                tracing::error!(order, reason, "outcome report failed");
            }
            EventKind::OrderRetired => {
                tracing::debug!(order, "order retired");
            }
            EventKind::ShutdownRequested => {
                tracing::info!("shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!("all orders stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(stuck = reason, "grace exceeded");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                tracing::warn!(kind = ?e.kind, reason, "subscriber problem");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
