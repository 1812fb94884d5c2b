use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use crate::order::{OrderId, Stats, Status};
use crate::policies::Difficulty;

/// Read-only view of a session, republished by its actor after every mutation.
///
/// Obtained through [`SignalRouter::inspect`](crate::SignalRouter::inspect).
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub id: OrderId,
    pub status: Status,
    /// Latest difficulty (reporting value).
    pub difficulty: Difficulty,
    /// Difficulty the deadline was computed from; `None` while pending.
    pub frozen_difficulty: Option<Difficulty>,
    /// Total time budget; `None` while pending.
    pub budget: Option<Duration>,
    /// When the deadline fires; `None` while pending.
    pub deadline_at: Option<Instant>,
    pub created_at: SystemTime,
    pub completed: u32,
    pub perfect: u32,
    pub mistakes: u32,
    pub total_steps: u32,
    /// Step signals waiting behind the in-flight validation.
    pub queued: usize,
}

impl SessionSnapshot {
    /// Current counters as [`Stats`].
    pub fn stats(&self) -> Stats {
        Stats {
            completed_steps: self.completed,
            total_steps: self.total_steps,
            perfect_steps: self.perfect,
            mistakes: self.mistakes,
        }
    }
}
