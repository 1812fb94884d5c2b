//! # External collaborators ("activities").
//!
//! A session calls out to two potentially slow collaborators:
//! - [`StepValidator`] - decides whether a reported step is valid
//! - [`OutcomeReporter`] - receives the final [`Outcome`](crate::Outcome) once
//!
//! Both are traits held as `Arc<dyn ...>` ([`ValidatorRef`], [`ReporterRef`]).
//! Function-backed adapters ([`ValidatorFn`], [`ReporterFn`]) wrap async closures,
//! and [`AcceptAll`] / [`LogReporter`] are ready-made defaults.

mod reporter;
mod validator;

pub use reporter::{LogReporter, OutcomeReporter, ReporterFn, ReporterRef};
pub use validator::{AcceptAll, StepValidator, ValidatorFn, ValidatorRef};
