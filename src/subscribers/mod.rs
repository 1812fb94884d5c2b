//! # Event subscribers for the ordervisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! OrderSession ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!                                                                    │
//!                                                        ┌───────────┼───────────┐
//!                                                        ▼           ▼           ▼
//!                                                    LogWriter    Metrics      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use ordervisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Scoreboard;
//!
//! #[async_trait]
//! impl Subscribe for Scoreboard {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::OrderFinished {
//!             // update leaderboard...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "scoreboard"
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
