//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by order sessions, the registry,
//! the router and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] broadcast of all events, [`OrderEvents`] follower of one order
//!
//! ## Quick reference
//! - **Publishers**: `OrderSession`, `SessionRegistry`,
//!   `SignalRouter` (shutdown), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the router's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver from [`SignalRouter::events`](crate::SignalRouter::events).

mod bus;
mod event;

pub use bus::{Bus, OrderEvents};
pub use event::{Event, EventKind};
