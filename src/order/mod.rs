//! # Order data model.
//!
//! This module provides the order-related types:
//! - [`OrderId`] - opaque, cheaply cloneable session identifier
//! - [`OrderSpec`] - steps, optional explicit id and initial difficulty
//! - [`Signal`] - asynchronous events addressed to a session
//! - [`Status`] - session lifecycle state
//! - [`Outcome`], [`Level`], [`Stats`] - the graded verdict of a finished session
//! - [`SessionSnapshot`] - read-only view of a live session

mod id;
mod outcome;
mod signal;
mod snapshot;
mod spec;
mod status;

pub use id::OrderId;
pub use outcome::{Level, Outcome, Stats};
pub use signal::Signal;
pub use snapshot::SessionSnapshot;
pub use spec::OrderSpec;
pub use status::Status;
