//! # Signals addressed to an order session.
//!
//! Signals are delivered through the session's bounded inbox and processed
//! strictly in arrival order, except that a `Cancel` takes effect before any
//! pending validator result is applied.

use crate::policies::Difficulty;

/// Marker suffix used on the wire to flag a perfectly executed step.
const PERFECT_MARKER: &str = ":perfect";

/// Asynchronous event for a specific session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Player selected a difficulty. Affects the deadline only before launch.
    DifficultySet(Difficulty),
    /// Player reports a finished step.
    StepCompleted {
        /// Step name passed to the validator.
        step: String,
        /// Whether the step was executed perfectly.
        perfect: bool,
    },
    /// Abort the order.
    Cancel,
}

impl Signal {
    /// Shorthand for [`Signal::StepCompleted`].
    pub fn step(step: impl Into<String>, perfect: bool) -> Self {
        Signal::StepCompleted {
            step: step.into(),
            perfect,
        }
    }

    /// Parses the wire form of a step signal, where a trailing `:perfect`
    /// marks the step as perfect.
    ///
    /// ```
    /// use ordervisor::Signal;
    ///
    /// assert_eq!(Signal::parse_step("Chop:perfect"), Signal::step("Chop", true));
    /// assert_eq!(Signal::parse_step("Chop"), Signal::step("Chop", false));
    /// ```
    pub fn parse_step(raw: &str) -> Self {
        match raw.strip_suffix(PERFECT_MARKER) {
            Some(step) => Signal::step(step, true),
            None => Signal::step(raw, false),
        }
    }

    /// Short stable name for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Signal::DifficultySet(_) => "difficulty_set",
            Signal::StepCompleted { .. } => "step_completed",
            Signal::Cancel => "cancel",
        }
    }
}
