//! # Order specification.
//!
//! Defines [`OrderSpec`], the input of [`SignalRouter::start`](crate::SignalRouter::start)
//! and [`SignalRouter::stage`](crate::SignalRouter::stage).
//!
//! ## Example
//! ```rust
//! use ordervisor::{Difficulty, OrderSpec};
//!
//! let spec = OrderSpec::new(["Chop", "Mix", "Plate"])
//!     .with_id("table-4")
//!     .with_difficulty(Difficulty::Hard);
//! assert_eq!(spec.steps().len(), 3);
//! assert_eq!(spec.id().map(|id| id.as_str()), Some("table-4"));
//! ```

use crate::order::OrderId;
use crate::policies::Difficulty;

/// Steps plus optional explicit id and initial difficulty.
#[derive(Clone, Debug)]
pub struct OrderSpec {
    id: Option<OrderId>,
    steps: Vec<String>,
    difficulty: Option<Difficulty>,
}

impl OrderSpec {
    /// Creates a spec from an ordered list of step names.
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            steps: steps.into_iter().map(Into::into).collect(),
            difficulty: None,
        }
    }

    /// Returns a new spec with an explicit order id.
    pub fn with_id(mut self, id: impl Into<OrderId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns a new spec with an initial difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn id(&self) -> Option<&OrderId> {
        self.id.as_ref()
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub(crate) fn into_parts(self) -> (Option<OrderId>, Vec<String>, Option<Difficulty>) {
        (self.id, self.steps, self.difficulty)
    }
}
