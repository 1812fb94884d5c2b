//! # Outcome of a finished order session.
//!
//! Grading rules:
//! ```text
//! status != Completed                          → Level::None  (success = false)
//! perfect/total ≥ 0.5 && mistakes/total ≤ 0.3  → Level::Excellent
//! mistakes/total ≤ 0.3                         → Level::Good
//! otherwise                                    → Level::Basic
//! ```
//! Ratios are compared in integer arithmetic (`2·perfect ≥ total`,
//! `10·mistakes ≤ 3·total`), so boundaries are exact.

use serde::{Deserialize, Serialize};

use crate::order::{OrderId, Status};
use crate::policies::Difficulty;

/// Quality tier of a finished order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    None,
    Basic,
    Good,
    Excellent,
}

impl Level {
    /// Grades a session from its terminal status and final counters.
    pub fn grade(status: Status, stats: &Stats) -> Self {
        if status != Status::Completed || stats.total_steps == 0 {
            return Level::None;
        }
        let total = stats.total_steps as u64;
        let few_mistakes = 10 * stats.mistakes as u64 <= 3 * total;
        let high_quality = 2 * stats.perfect_steps as u64 >= total;

        match (high_quality, few_mistakes) {
            (true, true) => Level::Excellent,
            (false, true) => Level::Good,
            _ => Level::Basic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Basic => "basic",
            Level::Good => "good",
            Level::Excellent => "excellent",
        }
    }
}

/// Final counter snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub completed_steps: u32,
    pub total_steps: u32,
    pub perfect_steps: u32,
    pub mistakes: u32,
}

/// Immutable verdict delivered once per session to the reporter and subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub order_id: OrderId,
    pub success: bool,
    pub level: Level,
    /// Terminal status the session reached.
    pub status: Status,
    /// Last difficulty seen by the session (may differ from the one the deadline used).
    pub difficulty: Difficulty,
    pub stats: Stats,
}

impl Outcome {
    /// Builds the outcome for a session that reached `status`.
    pub fn new(order_id: OrderId, status: Status, difficulty: Difficulty, stats: Stats) -> Self {
        let success = status == Status::Completed;
        Self {
            level: Level::grade(status, &stats),
            order_id,
            success,
            status,
            difficulty,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(completed: u32, total: u32, perfect: u32, mistakes: u32) -> Stats {
        Stats {
            completed_steps: completed,
            total_steps: total,
            perfect_steps: perfect,
            mistakes,
        }
    }

    #[test]
    fn all_done_no_perfect_is_good() {
        assert_eq!(Level::grade(Status::Completed, &stats(3, 3, 0, 0)), Level::Good);
    }

    #[test]
    fn two_of_three_perfect_is_excellent() {
        assert_eq!(
            Level::grade(Status::Completed, &stats(3, 3, 2, 0)),
            Level::Excellent
        );
    }

    #[test]
    fn half_perfect_boundary_counts_as_excellent() {
        assert_eq!(
            Level::grade(Status::Completed, &stats(4, 4, 2, 0)),
            Level::Excellent
        );
        assert_eq!(Level::grade(Status::Completed, &stats(5, 5, 2, 0)), Level::Good);
    }

    #[test]
    fn mistake_ratio_boundary() {
        // 3/10 = 0.3 is still "few mistakes".
        assert_eq!(
            Level::grade(Status::Completed, &stats(10, 10, 5, 3)),
            Level::Excellent
        );
        // 4/10 is not.
        assert_eq!(Level::grade(Status::Completed, &stats(10, 10, 5, 4)), Level::Basic);
        // 1/3 ≈ 0.33 is not.
        assert_eq!(Level::grade(Status::Completed, &stats(3, 3, 3, 1)), Level::Basic);
    }

    #[test]
    fn non_completed_statuses_grade_none() {
        for status in [Status::TimedOut, Status::Cancelled, Status::Failed] {
            let o = Outcome::new("o".into(), status, Difficulty::Normal, stats(3, 3, 3, 0));
            assert!(!o.success);
            assert_eq!(o.level, Level::None);
        }
    }

    #[test]
    fn serializes_to_wire_schema() {
        let o = Outcome::new(
            "o-1".into(),
            Status::Completed,
            Difficulty::Hard,
            stats(3, 3, 2, 0),
        );
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["orderId"], "o-1");
        assert_eq!(v["success"], true);
        assert_eq!(v["level"], "excellent");
        assert_eq!(v["status"], "completed");
        assert_eq!(v["difficulty"], "hard");
        assert_eq!(v["stats"]["completedSteps"], 3);
        assert_eq!(v["stats"]["perfectSteps"], 2);
    }
}
