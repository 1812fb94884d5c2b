//! # Event bus for order sessions.
//!
//! [`Bus`] broadcasts every [`Event`] published by sessions, the registry and
//! the router. Two kinds of readers exist:
//! - the raw [`Bus::subscribe`] receiver (used by the router's subscriber listener),
//! - [`OrderEvents`], a follower that only yields the events of one order.
//!
//! ## Architecture
//! ```text
//!   OrderSession "a" ──┐                         ┌──► subscriber_listener ─► SubscriberSet
//!   OrderSession "b" ──┼──► Bus (broadcast) ─────┤
//!   SessionRegistry  ──┤                         └──► OrderEvents("a") ─► only order "a"
//!   SignalRouter     ──┘
//! ```
//!
//! Publishing never blocks. A slow reader loses the oldest events
//! (`Lagged`); [`OrderEvents`] counts them instead of failing. Session state
//! never depends on event delivery.

use tokio::sync::broadcast;

use super::event::{Event, EventKind};
use crate::order::OrderId;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` undelivered events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event; dropped when nobody listens.
    pub fn publish(&self, ev: Event) {
        if let Err(broadcast::error::SendError(ev)) = self.tx.send(ev) {
            tracing::trace!(kind = ?ev.kind, order = ev.order.as_deref(), "event without listeners");
        }
    }

    /// Receiver of every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Follows the events of a single order, starting now.
    ///
    /// The order does not have to exist yet; following an explicit id before
    /// `start` catches its `OrderCreated` event.
    pub fn follow(&self, order: impl Into<OrderId>) -> OrderEvents {
        OrderEvents {
            order: order.into(),
            rx: self.tx.subscribe(),
            lagged: 0,
        }
    }
}

/// Events of one order, in publication order.
pub struct OrderEvents {
    order: OrderId,
    rx: broadcast::Receiver<Event>,
    lagged: u64,
}

impl OrderEvents {
    /// Next event of the followed order; `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(ev) if ev.order.as_deref() == Some(self.order.as_str()) => return Some(ev),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.lagged += skipped;
                    tracing::debug!(order = %self.order, skipped, "order follower lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Skips ahead to the next event of `kind`.
    pub async fn next_of(&mut self, kind: EventKind) -> Option<Event> {
        while let Some(ev) = self.next().await {
            if ev.kind == kind {
                return Some(ev);
            }
        }
        None
    }

    /// Number of bus events (of any order) this follower missed by lagging.
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn follower_only_sees_its_order() {
        let bus = Bus::new(16);
        let mut table4 = bus.follow("table-4");

        bus.publish(Event::new(EventKind::OrderCreated).with_order("table-9"));
        bus.publish(Event::new(EventKind::ShutdownRequested));
        bus.publish(Event::new(EventKind::OrderCreated).with_order("table-4"));
        bus.publish(Event::new(EventKind::OrderStarted).with_order("table-4"));

        assert_eq!(table4.next().await.map(|e| e.kind), Some(EventKind::OrderCreated));
        assert_eq!(
            table4.next_of(EventKind::OrderStarted).await.map(|e| e.kind),
            Some(EventKind::OrderStarted)
        );
        assert_eq!(table4.lagged(), 0);
    }

    #[tokio::test]
    async fn follower_counts_lag_and_ends_with_the_bus() {
        let bus = Bus::new(2);
        let mut table4 = bus.follow("table-4");
        for _ in 0..4 {
            bus.publish(Event::new(EventKind::StepValidated).with_order("table-4"));
        }
        drop(bus);

        assert!(table4.next().await.is_some());
        assert_eq!(table4.lagged(), 2);
        assert!(table4.next().await.is_some());
        assert!(table4.next().await.is_none());
    }

    #[test]
    fn publishing_without_listeners_is_fine() {
        Bus::new(0).publish(Event::new(EventKind::ShutdownRequested));
    }
}
