//! # Session registry: one live session per order id.
//!
//! The registry creates sessions (spawning their actors), hands out handles
//! by id and forgets sessions once they retire.
//!
//! ## Architecture
//! ```text
//! SignalRouter::start/stage ─► SessionRegistry::create(spec)
//!                                 ├─► write lock: check id, insert handle (atomic)
//!                                 └─► tokio::spawn(OrderSession::run)
//!
//! SignalRouter::signal/subscribe/inspect ─► SessionRegistry::find(id) ─► SessionHandle
//!
//! OrderSession::run (after reporting) ─► SessionRegistry::retire(id)
//! ```
//!
//! ## Rules
//! - Registry owns the session handles (inbox sender + watch receivers)
//! - Actor spawning happens inside the registry (not in the router)
//! - `create` checks and inserts under a single write lock: concurrent creates
//!   of one id never both succeed
//! - After `close()`, `create` fails with `ShuttingDown`; live sessions keep running

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::core::session::{Command, OrderSession, SessionServices};
use crate::error::OrderError;
use crate::events::{Event, EventKind};
use crate::order::{OrderId, OrderSpec, Outcome, SessionSnapshot, Stats};

/// Cloneable handle to a live session.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    pub id: OrderId,
    pub inbox: mpsc::Sender<Command>,
    pub state: watch::Receiver<SessionSnapshot>,
    pub outcome: watch::Receiver<Option<Outcome>>,
}

/// Registry of live order sessions.
pub(crate) struct SessionRegistry {
    sessions: RwLock<HashMap<OrderId, SessionHandle>>,
    closed: RwLock<bool>,
    live: watch::Sender<usize>,
    services: SessionServices,
    inbox_capacity: usize,
    runtime_token: CancellationToken,
}

impl SessionRegistry {
    /// Creates a new registry.
    pub(crate) fn new(
        services: SessionServices,
        inbox_capacity: usize,
        runtime_token: CancellationToken,
    ) -> Arc<Self> {
        let (live, _) = watch::channel(0usize);
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            closed: RwLock::new(false),
            live,
            services,
            inbox_capacity: inbox_capacity.max(1),
            runtime_token,
        })
    }

    /// Registers a pending session for `spec` and spawns its actor.
    pub(crate) async fn create(self: &Arc<Self>, spec: OrderSpec) -> Result<SessionHandle, OrderError> {
        let (id, steps, difficulty) = spec.into_parts();
        if steps.is_empty() {
            return Err(OrderError::EmptySteps);
        }
        let id = id.unwrap_or_else(OrderId::generate);
        let difficulty = difficulty.unwrap_or_default();

        // Lock order: closed → sessions (same as `close`).
        let closed = self.closed.read().await;
        if *closed {
            return Err(OrderError::ShuttingDown);
        }
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            drop(sessions);
            tracing::debug!(order = %id, "rejecting duplicate order id");
            return Err(OrderError::DuplicateOrder { id });
        }

        let total_steps = steps.len() as u32;
        let (session, state) =
            OrderSession::new(id.clone(), steps, difficulty, self.services.clone());
        let (inbox_tx, inbox_rx) = mpsc::channel(self.inbox_capacity);
        let (outcome_tx, outcome_rx) = watch::channel(None);

        let handle = SessionHandle {
            id: id.clone(),
            inbox: inbox_tx,
            state,
            outcome: outcome_rx,
        };
        tokio::spawn(session.run(
            inbox_rx,
            self.runtime_token.child_token(),
            Arc::downgrade(self),
            outcome_tx,
        ));

        sessions.insert(id.clone(), handle.clone());
        self.live.send_modify(|n| *n += 1);
        drop(sessions);
        drop(closed);

        self.services.bus.publish(
            Event::new(EventKind::OrderCreated)
                .with_order(&id)
                .with_difficulty(difficulty)
                .with_stats(Stats {
                    total_steps,
                    ..Stats::default()
                }),
        );
        Ok(handle)
    }

    /// Returns the handle of a live session.
    pub(crate) async fn find(&self, id: &OrderId) -> Result<SessionHandle, OrderError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound { id: id.clone() })
    }

    /// Removes a terminated session. Returns `false` if it was not registered.
    pub(crate) async fn retire(&self, id: &OrderId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            self.live.send_modify(|n| *n = n.saturating_sub(1));
            self.services
                .bus
                .publish(Event::new(EventKind::OrderRetired).with_order(id));
        }
        removed
    }

    /// Returns sorted list of live order ids.
    pub(crate) async fn list(&self) -> Vec<OrderId> {
        let sessions = self.sessions.read().await;
        let mut ids: Vec<OrderId> = sessions.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Stops accepting new sessions.
    pub(crate) async fn close(&self) {
        *self.closed.write().await = true;
    }

    pub(crate) async fn is_closed(&self) -> bool {
        *self.closed.read().await
    }

    /// Waits until no session is live.
    pub(crate) async fn drained(&self) {
        let mut rx = self.live.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Cancels every live session; each still reports its outcome and retires.
    pub(crate) fn cancel_all(&self) {
        self.runtime_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::{AcceptAll, LogReporter};
    use crate::events::Bus;
    use crate::policies::DeadlineScheduler;
    use crate::{Difficulty, Status};
    use std::time::Duration;

    fn registry() -> Arc<SessionRegistry> {
        let services = SessionServices {
            validator: Arc::new(AcceptAll),
            reporter: Arc::new(LogReporter),
            scheduler: DeadlineScheduler::new(Duration::from_secs(10)),
            validation_timeout: Duration::from_secs(60),
            report_timeout: Some(Duration::from_secs(60)),
            bus: Bus::new(64),
        };
        SessionRegistry::new(services, 8, CancellationToken::new())
    }

    #[tokio::test]
    async fn create_allocates_an_id_and_starts_pending() {
        let reg = registry();
        let handle = reg.create(OrderSpec::new(["Chop"])).await.unwrap();
        assert!(!handle.id.as_str().is_empty());

        let snap = handle.state.borrow().clone();
        assert_eq!(snap.status, Status::Pending);
        assert_eq!(snap.difficulty, Difficulty::Normal);
        assert_eq!(reg.list().await, vec![handle.id.clone()]);
    }

    #[tokio::test]
    async fn duplicate_explicit_id_is_rejected() {
        let reg = registry();
        let first = reg
            .create(OrderSpec::new(["Chop"]).with_id("dup"))
            .await
            .unwrap();
        let err = reg
            .create(OrderSpec::new(["Mix"]).with_id("dup"))
            .await
            .err()
            .unwrap();
        assert_eq!(err, OrderError::DuplicateOrder { id: "dup".into() });
        assert_eq!(reg.find(&first.id).await.unwrap().state.borrow().total_steps, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_of_one_id_admit_exactly_one() {
        let reg = registry();
        let mut joins = Vec::new();
        for _ in 0..16 {
            let reg = reg.clone();
            joins.push(tokio::spawn(async move {
                reg.create(OrderSpec::new(["Chop"]).with_id("race")).await.is_ok()
            }));
        }
        let mut admitted = 0;
        for j in joins {
            if j.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn empty_steps_and_closed_registry_are_rejected() {
        let reg = registry();
        let empty: [&str; 0] = [];
        assert_eq!(
            reg.create(OrderSpec::new(empty)).await.err(),
            Some(OrderError::EmptySteps)
        );

        reg.close().await;
        assert!(reg.is_closed().await);
        assert_eq!(
            reg.create(OrderSpec::new(["Chop"])).await.err(),
            Some(OrderError::ShuttingDown)
        );
    }

    #[tokio::test]
    async fn retire_forgets_the_session() {
        let reg = registry();
        let handle = reg
            .create(OrderSpec::new(["Chop"]).with_id("gone"))
            .await
            .unwrap();
        assert!(reg.retire(&handle.id).await);
        assert!(!reg.retire(&handle.id).await);
        assert_eq!(
            reg.find(&handle.id).await.err(),
            Some(OrderError::NotFound { id: "gone".into() })
        );
        reg.drained().await;
    }
}
