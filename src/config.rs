//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the order runtime.
//!
//! Config is used by [`RouterBuilder`](crate::RouterBuilder) to size the bus and
//! session inboxes, and by every session for its time bounds.
//!
//! ## Sentinel values
//! - `report_timeout = 0s` → the reporter call is not bounded
//! - `inbox_capacity = 0`, `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for the order runtime.
///
/// ## Field semantics
/// - `base_step_budget`: time per step at normal difficulty
/// - `validation_timeout`: bound on one validator call (timeout = mistake)
/// - `report_timeout`: bound on the reporter call (`0s` = unbounded)
/// - `inbox_capacity`: per-session signal queue size (senders wait when full)
/// - `bus_capacity`: event bus ring buffer size
/// - `grace`: how long shutdown waits for live sessions to finish
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time granted per step at normal difficulty.
    pub base_step_budget: Duration,

    /// Maximum duration of a single `validate_step` call.
    ///
    /// A call that exceeds it is abandoned and counted as a mistake.
    pub validation_timeout: Duration,

    /// Maximum duration of the `finish_order` call.
    ///
    /// - `Duration::ZERO` = unbounded
    /// - On timeout the failure is logged; the session still retires.
    pub report_timeout: Duration,

    /// Capacity of each session's inbox.
    ///
    /// [`SignalRouter::signal`](crate::SignalRouter::signal) waits while the inbox is full.
    pub inbox_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Maximum time to wait for live sessions during shutdown.
    ///
    /// When it runs out, remaining sessions are cancelled and
    /// `RuntimeError::GraceExceeded` is returned.
    pub grace: Duration,
}

impl Config {
    /// Returns the reporter bound as an `Option`.
    #[inline]
    pub fn report_timeout(&self) -> Option<Duration> {
        if self.report_timeout == Duration::ZERO {
            None
        } else {
            Some(self.report_timeout)
        }
    }

    /// Returns the inbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn inbox_capacity_clamped(&self) -> usize {
        self.inbox_capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `base_step_budget = 10s`
    /// - `validation_timeout = 60s`
    /// - `report_timeout = 60s`
    /// - `inbox_capacity = 64`
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            base_step_budget: Duration::from_secs(10),
            validation_timeout: Duration::from_secs(60),
            report_timeout: Duration::from_secs(60),
            inbox_capacity: 64,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinels() {
        let cfg = Config {
            report_timeout: Duration::ZERO,
            inbox_capacity: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.report_timeout(), None);
        assert_eq!(cfg.inbox_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn defaults_match_order_rules() {
        let cfg = Config::default();
        assert_eq!(cfg.base_step_budget, Duration::from_secs(10));
        assert_eq!(cfg.validation_timeout, Duration::from_secs(60));
        assert_eq!(cfg.report_timeout(), Some(Duration::from_secs(60)));
    }
}
