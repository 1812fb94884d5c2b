//! # Deadline scheduling.
//!
//! [`DeadlineScheduler`] computes the total time budget of a session:
//!
//! ```text
//! budget = step_count × base_step_budget × factor(difficulty)
//! ```
//!
//! and hands out a [`Deadline`], a one-shot countdown that either fires once
//! after the budget or never fires if cancelled first.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use ordervisor::{DeadlineScheduler, Difficulty};
//!
//! let scheduler = DeadlineScheduler::new(Duration::from_secs(10));
//! assert_eq!(
//!     scheduler.compute_budget(3, Difficulty::Hard),
//!     Duration::from_millis(24_000),
//! );
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::policies::Difficulty;

/// Computes per-session time budgets.
#[derive(Clone, Copy, Debug)]
pub struct DeadlineScheduler {
    base_step_budget: Duration,
}

impl DeadlineScheduler {
    /// Creates a scheduler granting `base_step_budget` per step at normal difficulty.
    pub fn new(base_step_budget: Duration) -> Self {
        Self { base_step_budget }
    }

    /// Total budget for `step_count` steps at `difficulty`.
    ///
    /// Computed in integer milliseconds, saturating at `u64::MAX` ms.
    pub fn compute_budget(&self, step_count: usize, difficulty: Difficulty) -> Duration {
        let ms = self.base_step_budget.as_millis()
            * step_count as u128
            * u128::from(difficulty.factor_percent())
            / 100;
        Duration::from_millis(ms.min(u128::from(u64::MAX)) as u64)
    }

    /// Starts a countdown of `budget` from now.
    pub fn start(&self, budget: Duration) -> Deadline {
        Deadline::start(budget)
    }
}

/// One-shot cancellable countdown.
///
/// ### Rules
/// - [`Deadline::expired`] resolves to `true` once the instant is reached
/// - after [`Deadline::cancel`], `expired` resolves to `false` and the timer never fires
/// - both outcomes are final
#[derive(Debug)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
    cancel: CancellationToken,
}

impl Deadline {
    /// Starts a countdown of `budget` from now.
    pub fn start(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
            cancel: CancellationToken::new(),
        }
    }

    /// Instant at which the deadline fires.
    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Stops the countdown; a pending or future [`Deadline::expired`] returns `false`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits until the deadline fires (`true`) or is cancelled (`false`).
    ///
    /// Cancel-safe: dropping the future does not affect the countdown.
    pub async fn expired(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = time::sleep_until(self.at) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> DeadlineScheduler {
        DeadlineScheduler::new(Duration::from_secs(10))
    }

    #[test]
    fn budget_matches_formula_for_every_level() {
        let s = scheduler();
        for steps in 1..=12usize {
            assert_eq!(
                s.compute_budget(steps, Difficulty::Easy),
                Duration::from_millis(steps as u64 * 12_000)
            );
            assert_eq!(
                s.compute_budget(steps, Difficulty::Normal),
                Duration::from_millis(steps as u64 * 10_000)
            );
            assert_eq!(
                s.compute_budget(steps, Difficulty::Hard),
                Duration::from_millis(steps as u64 * 8_000)
            );
        }
    }

    #[test]
    fn three_hard_steps_is_24_seconds() {
        assert_eq!(
            scheduler().compute_budget(3, Difficulty::Hard),
            Duration::from_millis(24_000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_budget() {
        let started = Instant::now();
        let deadline = scheduler().start(Duration::from_secs(5));
        assert!(deadline.expired().await);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert!(Instant::now() >= deadline.at());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_deadline_never_fires() {
        let deadline = Deadline::start(Duration::from_secs(5));
        deadline.cancel();
        assert!(!deadline.expired().await);
        time::advance(Duration::from_secs(10)).await;
        assert!(!deadline.expired().await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_wakes_a_pending_waiter() {
        let deadline = std::sync::Arc::new(Deadline::start(Duration::from_secs(60)));
        let waiter = {
            let d = deadline.clone();
            tokio::spawn(async move { d.expired().await })
        };
        tokio::task::yield_now().await;
        deadline.cancel();
        assert!(!waiter.await.unwrap());
    }
}
