//! # ordervisor
//!
//! **Ordervisor** runs timed, multi-step "orders" as independent tokio actors.
//!
//! A player starts an order (an ordered list of steps), reports finished steps
//! through signals, and races a deadline derived from the step count and the
//! selected difficulty. Each reported step is checked by an external
//! [`StepValidator`]; when the session ends (all steps validated, deadline hit,
//! cancelled or failed) an [`Outcome`] with a quality [`Level`] is handed to an
//! [`OutcomeReporter`] exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     start(spec) / stage(spec)      signal(id, Signal)      subscribe(id)
//!            │                              │                      │
//!            ▼                              ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SignalRouter (public facade)                                     │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - SessionRegistry (live sessions by OrderId)                     │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ OrderSession │   │ OrderSession │   │ OrderSession │   │
//!     │ (inbox loop) │   │ (inbox loop) │   │ (inbox loop) │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ StepValidator    │ Deadline         │ OutcomeReporter │
//!      │                  │                  │                 │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │   (in SignalRouter)    │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! pending ──Start──► running ──all steps validated──► completed
//!    │                  ├──deadline fired──────────► timed_out
//!    │                  ├──Cancel / shutdown───────► cancelled
//!    │                  └──panic while processing──► failed
//!    └──Cancel / shutdown──────────────────────────► cancelled
//!
//! terminal ─► OrderFinished ─► reporter.finish_order(outcome) ─► retire ─► OutcomeWaiter
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Routing**       | Create sessions, deliver signals, await outcomes.            | [`SignalRouter`], [`OutcomeWaiter`]         |
//! | **Orders**        | Steps, signals, statuses and graded outcomes.                | [`OrderSpec`], [`Signal`], [`Outcome`]      |
//! | **Timing**        | Difficulty-scaled deadline per order.                        | [`Difficulty`], [`DeadlineScheduler`]       |
//! | **Collaborators** | Pluggable step validation and outcome reporting.             | [`StepValidator`], [`OutcomeReporter`]      |
//! | **Subscriber API**| Hook into session events (logging, metrics, custom).         | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for callers, collaborators and the runtime.     | [`OrderError`], [`ActivityError`], [`RuntimeError`] |
//! | **Configuration** | Centralize runtime settings.                                 | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use ordervisor::{Config, Difficulty, LogWriter, OrderSpec, Signal, SignalRouter, Status, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let router = SignalRouter::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // Stage, pick a difficulty, then start the clock.
//!     let id = router.stage(OrderSpec::new(["Chop", "Mix", "Plate"])).await?;
//!     router.signal(&id, Signal::DifficultySet(Difficulty::Hard)).await?;
//!     router.launch(&id).await?;
//!
//!     let waiter = router.subscribe(&id).await?;
//!     for raw in ["Chop:perfect", "Mix", "Plate:perfect"] {
//!         router.signal(&id, Signal::parse_step(raw)).await?;
//!     }
//!
//!     let outcome = waiter.recv().await?;
//!     assert_eq!(outcome.status, Status::Completed);
//!     assert_eq!(outcome.stats.perfect_steps, 2);
//!
//!     router.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod activities;
mod config;
mod core;
mod error;
mod events;
mod order;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use activities::{
    AcceptAll, LogReporter, OutcomeReporter, ReporterFn, ReporterRef, StepValidator, ValidatorFn,
    ValidatorRef,
};
pub use config::Config;
pub use crate::core::{OutcomeWaiter, RouterBuilder, SignalRouter};
pub use error::{ActivityError, OrderError, RuntimeError};
pub use events::{Bus, Event, EventKind, OrderEvents};
pub use order::{Level, OrderId, OrderSpec, Outcome, SessionSnapshot, Signal, Stats, Status};
pub use policies::{Deadline, DeadlineScheduler, Difficulty};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
