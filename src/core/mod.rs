//! Runtime core: sessions, routing and lifecycle.
//!
//! The only public API from this module is [`SignalRouter`] (with its
//! [`RouterBuilder`] and [`OutcomeWaiter`]), which creates order sessions,
//! routes signals to them and drives graceful shutdown.
//!
//! Internal modules:
//! - [`session`]: the per-order actor (state machine, deadline race, reporting);
//! - [`validation`]: one bounded validator call kept in flight by the session;
//! - [`registry`]: live sessions by id, creation and retirement;
//! - [`router`]: public facade, subscriber fan-out and shutdown;
//! - [`builder`]: wires configuration and collaborators into a router;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod registry;
mod router;
mod session;
mod shutdown;
mod validation;

pub use builder::RouterBuilder;
pub use router::{OutcomeWaiter, SignalRouter};
