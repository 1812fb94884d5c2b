//! # SignalRouter: public entry point of the order runtime.
//!
//! The [`SignalRouter`] owns the event bus, the session registry and a
//! [`SubscriberSet`]. It translates caller requests into commands on the right
//! session and drives graceful shutdown.
//!
//! ## Key responsibilities
//! - create sessions (`start`, `stage` + `launch`) through the registry
//! - deliver signals to live sessions, `NotFound` for unknown/retired ids
//! - hand out one-shot outcome waiters and snapshots
//! - subscribe to the [`Bus`] and **fan-out** events via [`SubscriberSet`]
//! - drain on shutdown within [`Config::grace`], then flush and stop subscribers
//!
//! ## High-level architecture
//! ```text
//! start(spec) ──► SessionRegistry::create ──► OrderSession actor ──► Command::Start
//! signal(id, s) ──► SessionRegistry::find(id) ──► inbox.send(Command::Signal(s))
//! subscribe(id) ──► SessionRegistry::find(id) ──► OutcomeWaiter (watch receiver)
//!
//! Event flow:
//!   OrderSession ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!
//! Shutdown path:
//!   shutdown() / shutdown_when(trigger) / shutdown_on_signal()
//!     └─► registry.close()                  → new orders fail with ShuttingDown
//!     └─► Bus.publish(ShutdownRequested { reason })
//!     └─► wait registry drained within cfg.grace:
//!            ├─ Ok      → Bus.publish(AllStoppedWithin)
//!            └─ Timeout → Bus.publish(GraceExceeded), cancel sessions,
//!                         wait up to cfg.grace more for them to report,
//!                         Err(RuntimeError::GraceExceeded { stuck })
//!     └─► stop listener: flush queued events, SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```rust
//! use ordervisor::{OrderSpec, RouterBuilder, Config, Signal, Level};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = RouterBuilder::new(Config::default()).build();
//!
//!     let id = router.start(OrderSpec::new(["Chop", "Plate"])).await?;
//!     let waiter = router.subscribe(&id).await?;
//!
//!     router.signal(&id, Signal::step("Chop", true)).await?;
//!     router.signal(&id, Signal::step("Plate", false)).await?;
//!
//!     let outcome = waiter.recv().await?;
//!     assert!(outcome.success);
//!     assert_eq!(outcome.level, Level::Excellent);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::{SessionHandle, SessionRegistry};
use crate::core::session::Command;
use crate::core::shutdown;
use crate::error::{OrderError, RuntimeError};
use crate::events::{Bus, Event, EventKind, OrderEvents};
use crate::order::{OrderId, OrderSpec, Outcome, SessionSnapshot, Signal};
use crate::subscribers::SubscriberSet;

/// Resolves once with the outcome of one order.
///
/// Obtained from [`SignalRouter::subscribe`]. Several waiters may exist for one
/// order; each of them receives the outcome exactly once.
pub struct OutcomeWaiter {
    id: OrderId,
    rx: watch::Receiver<Option<Outcome>>,
}

impl OutcomeWaiter {
    /// Waits for the session to terminate and returns its outcome.
    pub async fn recv(mut self) -> Result<Outcome, OrderError> {
        let id = self.id;
        match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().ok_or(OrderError::Closed { id }),
            Err(_) => Err(OrderError::Closed { id }),
        }
    }
}

/// Routes caller requests to order sessions.
pub struct SignalRouter {
    cfg: Config,
    bus: Bus,
    registry: Arc<SessionRegistry>,
    listener: Mutex<Option<JoinHandle<()>>>,
    listener_stop: CancellationToken,
}

impl SignalRouter {
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        registry: Arc<SessionRegistry>,
        subs: SubscriberSet,
    ) -> Self {
        let listener_stop = CancellationToken::new();
        let listener = Self::subscriber_listener(&bus, subs, listener_stop.clone());
        Self {
            cfg,
            bus,
            registry,
            listener: Mutex::new(Some(listener)),
            listener_stop,
        }
    }

    /// Creates a session for `spec` and starts its clock immediately.
    ///
    /// Fails with `DuplicateOrder` if an explicit id is already live,
    /// `EmptySteps` for an empty step list, `ShuttingDown` after shutdown began.
    pub async fn start(&self, spec: OrderSpec) -> Result<OrderId, OrderError> {
        let handle = self.registry.create(spec).await?;
        Self::deliver(&handle, Command::Start).await;
        Ok(handle.id)
    }

    /// Creates a `pending` session without starting its clock.
    ///
    /// `DifficultySet` signals sent before [`SignalRouter::launch`] decide the
    /// deadline; `StepCompleted` signals are ignored until then.
    pub async fn stage(&self, spec: OrderSpec) -> Result<OrderId, OrderError> {
        Ok(self.registry.create(spec).await?.id)
    }

    /// Starts the clock of a staged session (no-op if it already started).
    pub async fn launch(&self, id: &OrderId) -> Result<(), OrderError> {
        let handle = self.registry.find(id).await?;
        Self::deliver(&handle, Command::Start).await;
        Ok(())
    }

    /// Delivers a signal to a live session.
    ///
    /// Returns once the signal is queued (waits while the inbox is full).
    /// Signals reaching a session that is already terminal are acknowledged
    /// and have no effect.
    pub async fn signal(&self, id: &OrderId, signal: Signal) -> Result<(), OrderError> {
        let handle = self.registry.find(id).await?;
        Self::deliver(&handle, Command::Signal(signal)).await;
        Ok(())
    }

    /// Returns a waiter resolving with the order's outcome.
    pub async fn subscribe(&self, id: &OrderId) -> Result<OutcomeWaiter, OrderError> {
        let handle = self.registry.find(id).await?;
        Ok(OutcomeWaiter {
            id: handle.id,
            rx: handle.outcome,
        })
    }

    /// Returns the latest snapshot of a live session.
    pub async fn inspect(&self, id: &OrderId) -> Result<SessionSnapshot, OrderError> {
        let handle = self.registry.find(id).await?;
        let snapshot = handle.state.borrow().clone();
        Ok(snapshot)
    }

    /// Returns sorted ids of live sessions.
    pub async fn live_orders(&self) -> Vec<OrderId> {
        self.registry.list().await
    }

    /// Creates a new receiver of all runtime events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Follows the events of one order from now on (see [`Bus::follow`]).
    pub fn follow(&self, id: impl Into<OrderId>) -> OrderEvents {
        self.bus.follow(id)
    }

    /// Stops accepting orders and waits for live sessions to finish.
    ///
    /// Live sessions terminate naturally (completion, deadline, cancel). If they
    /// do not within [`Config::grace`], they are cancelled (each still reports
    /// its outcome) and [`RuntimeError::GraceExceeded`] lists them.
    /// Subscribers receive every event published up to the end of the drain
    /// and are stopped before this returns.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.drain("requested").await
    }

    /// Waits for `trigger`, then drains like [`SignalRouter::shutdown`].
    ///
    /// The trigger's output becomes the reason of the `ShutdownRequested` event.
    pub async fn shutdown_when<F, R>(&self, trigger: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = R>,
        R: AsRef<str>,
    {
        let reason = trigger.await;
        self.drain(reason.as_ref()).await
    }

    /// Drains once SIGINT/SIGTERM/SIGQUIT arrives (Ctrl-C elsewhere).
    pub async fn shutdown_on_signal(&self) -> Result<(), RuntimeError> {
        self.shutdown_when(async {
            match shutdown::stop_signal().await {
                Ok(sig) => sig.as_str(),
                Err(err) => {
                    tracing::warn!(error = %err, "signal registration failed; draining now");
                    "signal_registration_failed"
                }
            }
        })
        .await
    }

    async fn drain(&self, reason: &str) -> Result<(), RuntimeError> {
        self.registry.close().await;
        let live = self.registry.list().await.len();
        tracing::info!(reason, live, "draining orders");
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));

        let grace = self.cfg.grace;
        let res = match time::timeout(grace, self.registry.drained()).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let stuck: Vec<String> = self
                    .registry
                    .list()
                    .await
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")),
                );
                self.registry.cancel_all();
                if time::timeout(grace, self.registry.drained()).await.is_err() {
                    tracing::warn!(?grace, "cancelled orders still reporting; subscribers stop anyway");
                }
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        };
        self.stop_subscribers().await;
        res
    }

    /// Stops the bus listener after it flushed queued events to the subscribers.
    async fn stop_subscribers(&self) {
        self.listener_stop.cancel();
        let listener = self.listener.lock().await.take();
        if let Some(listener) = listener {
            if let Err(err) = listener.await {
                tracing::warn!(error = %err, "subscriber listener ended abnormally");
            }
        }
    }

    /// Sends a command; a closed inbox means the session already terminated.
    async fn deliver(handle: &SessionHandle, cmd: Command) {
        let label = match &cmd {
            Command::Start => "start",
            Command::Signal(signal) => signal.as_label(),
        };
        if handle.inbox.send(cmd).await.is_err() {
            tracing::trace!(order = %handle.id, command = label, "session already terminal; command dropped");
        }
    }

    /// Forwards bus events to the subscriber set until `stop`, then flushes
    /// what is still queued and shuts the set down.
    ///
    /// Subscriber notices (overflow/panic) are not fanned out again.
    fn subscriber_listener(bus: &Bus, set: SubscriberSet, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) if ev.is_subscriber_event() => {}
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) if ev.is_subscriber_event() => {}
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        })
    }
}

impl Drop for SignalRouter {
    fn drop(&mut self) {
        self.listener_stop.cancel();
    }
}
