use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    activities::{AcceptAll, LogReporter, ReporterRef, ValidatorRef},
    config::Config,
    events::Bus,
    policies::DeadlineScheduler,
    subscribers::{Subscribe, SubscriberSet},
};
use super::{registry::SessionRegistry, router::SignalRouter, session::SessionServices};

/// Builder for constructing a [`SignalRouter`] with its collaborators.
pub struct RouterBuilder {
    cfg: Config,
    validator: ValidatorRef,
    reporter: ReporterRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RouterBuilder {
    /// Creates a new builder with the given configuration.
    ///
    /// Defaults: [`AcceptAll`] validator, [`LogReporter`] reporter, no subscribers.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            validator: Arc::new(AcceptAll),
            reporter: Arc::new(LogReporter),
            subscribers: Vec::new(),
        }
    }

    /// Sets the collaborator deciding whether a reported step is valid.
    pub fn with_validator(mut self, validator: ValidatorRef) -> Self {
        self.validator = validator;
        self
    }

    /// Sets the collaborator receiving each final outcome.
    pub fn with_reporter(mut self, reporter: ReporterRef) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (session lifecycle, step verdicts, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the router.
    ///
    /// Must be called inside a tokio runtime: subscriber workers and the
    /// bus listener are spawned here.
    pub fn build(self) -> Arc<SignalRouter> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        let services = SessionServices {
            validator: self.validator,
            reporter: self.reporter,
            scheduler: DeadlineScheduler::new(self.cfg.base_step_budget),
            validation_timeout: self.cfg.validation_timeout,
            report_timeout: self.cfg.report_timeout(),
            bus: bus.clone(),
        };
        let registry = SessionRegistry::new(
            services,
            self.cfg.inbox_capacity_clamped(),
            CancellationToken::new(),
        );

        Arc::new(SignalRouter::new_internal(self.cfg, bus, registry, subs))
    }
}

impl SignalRouter {
    /// Shorthand for [`RouterBuilder::new`].
    pub fn builder(cfg: Config) -> RouterBuilder {
        RouterBuilder::new(cfg)
    }
}
