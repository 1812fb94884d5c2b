use serde::{Deserialize, Serialize};

/// Lifecycle state of an order session.
///
/// ```text
/// Pending ──► Running ──┬─► Completed
///    │                  ├─► TimedOut
///    │                  ├─► Cancelled
///    │                  └─► Failed
///    ├──────────────────────► Cancelled
///    └──────────────────────► Failed
/// ```
///
/// Terminal states are never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Created, clock not started.
    Pending,
    /// Clock running, accepting step signals.
    Running,
    /// Every step validated before the deadline.
    Completed,
    /// Deadline fired first.
    TimedOut,
    /// Cancelled by a caller or by runtime shutdown.
    Cancelled,
    /// Internal failure while processing a signal.
    Failed,
}

impl Status {
    /// True for `Completed`, `TimedOut`, `Cancelled` and `Failed`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Pending | Status::Running)
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Completed => "completed",
            Status::TimedOut => "timed_out",
            Status::Cancelled => "cancelled",
            Status::Failed => "failed",
        }
    }
}
