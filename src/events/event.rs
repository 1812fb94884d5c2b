//! # Runtime events emitted by order sessions and the router.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Session lifecycle**: created, started, terminal transitions, retired
//! - **Step processing**: validated, rejected, validation timeout/failure
//! - **Runtime**: shutdown requested, drained, grace exceeded
//! - **Subscriber health**: overflow, panic
//!
//! The [`Event`] struct carries metadata such as timestamps, order id, step
//! name, difficulty, budget and counters.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use ordervisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StepRejected)
//!     .with_order("table-4")
//!     .with_step("Chop")
//!     .with_reason("validator said no");
//!
//! assert_eq!(ev.kind, EventKind::StepRejected);
//! assert_eq!(ev.order.as_deref(), Some("table-4"));
//! assert_eq!(ev.step.as_deref(), Some("Chop"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::order::{Level, Stats, Status};
use crate::policies::Difficulty;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and reason ("full", "closed")
    SubscriberOverflow,

    // === Runtime events ===
    /// Shutdown requested; new orders are rejected from now on.
    ShutdownRequested,

    /// All live sessions finished within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; remaining sessions are being cancelled.
    ///
    /// Sets:
    /// - `reason`: stuck order ids
    GraceExceeded,

    // === Session lifecycle ===
    /// Session registered in `pending` state.
    ///
    /// Sets:
    /// - `order`, `difficulty` (initial), `stats` (total steps)
    OrderCreated,

    /// Session moved to `running`; deadline computed.
    ///
    /// Sets:
    /// - `order`, `difficulty` (frozen), `budget_ms`
    OrderStarted,

    /// Difficulty changed. Before start it affects the deadline, after start it is reporting-only.
    ///
    /// Sets:
    /// - `order`, `difficulty`, `status`
    DifficultyChanged,

    /// A signal was acknowledged but had no effect in the current state.
    ///
    /// Sets:
    /// - `order`, `status`, `reason` (signal label)
    SignalIgnored,

    /// Session reached a terminal state.
    ///
    /// Sets:
    /// - `order`, `status`, `level`, `stats`
    OrderFinished,

    /// Reporter accepted the outcome.
    ///
    /// Sets:
    /// - `order`, `level`
    OutcomeReported,

    /// Reporter failed or timed out; the session retires anyway.
    ///
    /// Sets:
    /// - `order`, `reason`
    ReportFailed,

    /// Session removed from the registry.
    ///
    /// Sets:
    /// - `order`
    OrderRetired,

    // === Step processing ===
    /// Validator accepted a step.
    ///
    /// Sets:
    /// - `order`, `step`, `stats`
    StepValidated,

    /// Validator rejected a step, failed, or timed out; counted as a mistake.
    ///
    /// Sets:
    /// - `order`, `step`, `reason`, `budget_ms` (the bound, on timeout), `stats`
    StepRejected,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Order id, if applicable.
    pub order: Option<Arc<str>>,
    /// Step name, if applicable.
    pub step: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Difficulty involved in the event.
    pub difficulty: Option<Difficulty>,
    /// Session status at the time of the event.
    pub status: Option<Status>,
    /// Deadline budget or call bound in milliseconds (compact).
    pub budget_ms: Option<u64>,
    /// Quality tier (terminal events).
    pub level: Option<Level>,
    /// Counter snapshot.
    pub stats: Option<Stats>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            order: None,
            step: None,
            reason: None,
            difficulty: None,
            status: None,
            budget_ms: None,
            level: None,
            stats: None,
        }
    }

    #[inline]
    pub fn with_order(mut self, order: impl AsRef<str>) -> Self {
        self.order = Some(Arc::from(order.as_ref()));
        self
    }

    #[inline]
    pub fn with_step(mut self, step: impl Into<Arc<str>>) -> Self {
        self.step = Some(step.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[inline]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a duration (stored as milliseconds).
    #[inline]
    pub fn with_budget(mut self, d: Duration) -> Self {
        self.budget_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    #[inline]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[inline]
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
