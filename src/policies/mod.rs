//! Timing policies.
//!
//! This module groups the knobs that control **how long** a player has to
//! finish an order.
//!
//! ## Contents
//! - [`Difficulty`] selected level and its time factor
//! - [`DeadlineScheduler`] total budget from step count and difficulty
//! - [`Deadline`] a cancellable one-shot countdown
//!
//! ## Quick wiring
//! ```text
//! OrderSession::start()
//!      └─► DeadlineScheduler::compute_budget(steps.len(), frozen difficulty)
//!      └─► DeadlineScheduler::start(budget) ─► Deadline (raced in the session loop)
//! ```
//!
//! ## Defaults
//! - `Difficulty::Normal` when nothing was selected before launch.
//! - 10s per step (`Config::base_step_budget`).

mod deadline;
mod difficulty;

pub use deadline::{Deadline, DeadlineScheduler};
pub use difficulty::Difficulty;
