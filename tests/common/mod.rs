#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ordervisor::{ActivityError, Event, EventKind, OrderId, Outcome, OutcomeReporter};
use tokio::sync::broadcast;

/// Reporter that keeps every outcome it receives.
#[derive(Default)]
pub struct RecordingReporter {
    seen: Mutex<Vec<Outcome>>,
}

impl RecordingReporter {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count_for(&self, id: &OrderId) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|o| &o.order_id == id)
            .count()
    }
}

#[async_trait]
impl OutcomeReporter for RecordingReporter {
    async fn finish_order(&self, outcome: &Outcome) -> Result<(), ActivityError> {
        self.seen.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

/// Receives events until one of `kind` for `order` shows up.
pub async fn next_event(rx: &mut broadcast::Receiver<Event>, kind: EventKind, order: &OrderId) -> Event {
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == kind && ev.order.as_deref() == Some(order.as_str()) => return ev,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("bus closed while waiting for {kind:?}"),
        }
    }
}

/// Installs a test `tracing` subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
