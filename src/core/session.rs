//! # OrderSession: single-order actor.
//!
//! Owns the state of one order and processes its commands strictly one at a
//! time, in arrival order:
//! - freezes difficulty and starts the [`Deadline`] on `Start`,
//! - queues `StepCompleted` signals behind a single in-flight validation,
//! - races "all steps validated" against the deadline,
//! - reports the [`Outcome`] exactly once and retires from the registry.
//!
//! ## Event loop
//! ```text
//! loop while status is pending/running {
//!   ├─► if idle and running: pop queued step → spawn_validation()
//!   └─► select! (biased)
//!         ├─ runtime token cancelled → Cancelled
//!         ├─ deadline fired          → TimedOut
//!         ├─ inbox command           → Start / DifficultySet / StepCompleted / Cancel
//!         └─ validation finished     → completed/perfect or mistakes
//!                                      completed == total → Completed (deadline cancelled)
//! }
//! finish():
//!   Outcome::new() → reporter.finish_order() → registry.retire() → outcome watch
//! ```
//!
//! ## Rules
//! - The inbox is polled **before** the in-flight validation, so a queued
//!   `Cancel` always wins over a validator result that is ready at the same time.
//! - Results arriving after a terminal transition are dropped with the future.
//! - A panic while processing (validator included) is caught at the session
//!   boundary and turns the session into `Failed`; the outcome is still reported.
//! - A panicking reporter is caught as well: the session still retires and
//!   delivers its outcome.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Weak;
use std::time::{Duration, SystemTime};

use futures::FutureExt;
use futures::future::{BoxFuture, OptionFuture};
use tokio::sync::{mpsc, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::activities::{ReporterRef, ValidatorRef};
use crate::core::registry::SessionRegistry;
use crate::core::validation::{PendingStep, StepResult, spawn_validation};
use crate::error::{ActivityError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::order::{OrderId, Outcome, SessionSnapshot, Signal, Stats, Status};
use crate::policies::{Deadline, DeadlineScheduler, Difficulty};

/// Message delivered through a session's inbox.
#[derive(Debug)]
pub(crate) enum Command {
    /// pending → running.
    Start,
    Signal(Signal),
}

/// Collaborators and bounds shared by all sessions of one router.
#[derive(Clone)]
pub(crate) struct SessionServices {
    pub validator: ValidatorRef,
    pub reporter: ReporterRef,
    pub scheduler: DeadlineScheduler,
    pub validation_timeout: Duration,
    pub report_timeout: Option<Duration>,
    pub bus: Bus,
}

/// State of a single order, owned by its actor task.
pub(crate) struct OrderSession {
    id: OrderId,
    steps: Vec<String>,
    difficulty: Difficulty,
    frozen: Option<Difficulty>,
    status: Status,
    completed: u32,
    perfect: u32,
    mistakes: u32,
    deadline: Option<Deadline>,
    created_at: SystemTime,
    queue: VecDeque<PendingStep>,
    services: SessionServices,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl OrderSession {
    /// Creates a pending session and the watch channel carrying its snapshots.
    pub(crate) fn new(
        id: OrderId,
        steps: Vec<String>,
        difficulty: Difficulty,
        services: SessionServices,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let created_at = SystemTime::now();
        let initial = SessionSnapshot {
            id: id.clone(),
            status: Status::Pending,
            difficulty,
            frozen_difficulty: None,
            budget: None,
            deadline_at: None,
            created_at,
            completed: 0,
            perfect: 0,
            mistakes: 0,
            total_steps: steps.len() as u32,
            queued: 0,
        };
        let (state_tx, state_rx) = watch::channel(initial);
        let session = Self {
            id,
            steps,
            difficulty,
            frozen: None,
            status: Status::Pending,
            completed: 0,
            perfect: 0,
            mistakes: 0,
            deadline: None,
            created_at,
            queue: VecDeque::new(),
            services,
            state_tx,
        };
        (session, state_rx)
    }

    /// Runs the session to a terminal state, reports, retires and publishes the outcome.
    pub(crate) async fn run(
        mut self,
        mut inbox: mpsc::Receiver<Command>,
        runtime_token: CancellationToken,
        registry: Weak<SessionRegistry>,
        outcome_tx: watch::Sender<Option<Outcome>>,
    ) {
        let driven = AssertUnwindSafe(self.drive(&mut inbox, &runtime_token))
            .catch_unwind()
            .await;
        if let Err(panic) = driven {
            let info = panic_message(panic.as_ref());
            tracing::error!(order = %self.id, %info, "session failed while processing a signal");
            self.queue.clear();
            self.transition(Status::Failed);
        }
        // Senders blocked on a full inbox get an error instead of waiting forever.
        inbox.close();

        let outcome = Outcome::new(self.id.clone(), self.status, self.difficulty, self.stats());
        self.services.bus.publish(
            Event::new(EventKind::OrderFinished)
                .with_order(&self.id)
                .with_status(outcome.status)
                .with_level(outcome.level)
                .with_stats(outcome.stats),
        );

        let reported = AssertUnwindSafe(self.report(&outcome)).catch_unwind().await;
        if let Err(panic) = reported {
            let info = panic_message(panic.as_ref());
            tracing::error!(order = %self.id, %info, "outcome reporter panicked");
            self.services.bus.publish(
                Event::new(EventKind::ReportFailed)
                    .with_order(&self.id)
                    .with_reason(format!("reporter panicked: {info}")),
            );
        }
        if let Some(registry) = registry.upgrade() {
            registry.retire(&self.id).await;
        }
        outcome_tx.send_replace(Some(outcome));
    }

    /// Processes commands until the session leaves pending/running.
    async fn drive(&mut self, inbox: &mut mpsc::Receiver<Command>, runtime_token: &CancellationToken) {
        let mut in_flight: Option<BoxFuture<'static, StepResult>> = None;
        let mut inbox_open = true;

        while !self.status.is_terminal() {
            if in_flight.is_none() && self.status == Status::Running {
                if let Some(pending) = self.queue.pop_front() {
                    in_flight = Some(spawn_validation(
                        self.services.validator.clone(),
                        self.id.clone(),
                        pending,
                        self.services.validation_timeout,
                    ));
                    self.publish_snapshot();
                }
            }

            tokio::select! {
                biased;

                _ = runtime_token.cancelled() => {
                    self.transition(Status::Cancelled);
                }
                fired = Self::deadline_fired(self.deadline.as_ref()), if self.status == Status::Running => {
                    if fired {
                        self.transition(Status::TimedOut);
                    }
                }
                cmd = inbox.recv(), if inbox_open => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => {
                        inbox_open = false;
                        // Nobody can start or cancel a pending session any more.
                        if self.status == Status::Pending {
                            self.transition(Status::Cancelled);
                        }
                    }
                },
                Some(result) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    self.apply(result);
                }
            }
        }
    }

    async fn deadline_fired(deadline: Option<&Deadline>) -> bool {
        match deadline {
            Some(d) => d.expired().await,
            None => std::future::pending().await,
        }
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Start => self.start(),
            Command::Signal(signal) => self.on_signal(signal),
        }
    }

    fn on_signal(&mut self, signal: Signal) {
        let label = signal.as_label();
        match signal {
            Signal::DifficultySet(level) => self.set_difficulty(level),
            Signal::StepCompleted { step, perfect } if self.status == Status::Running => {
                self.queue.push_back(PendingStep { step, perfect });
                self.publish_snapshot();
            }
            Signal::StepCompleted { .. } => self.ignore(label),
            Signal::Cancel => {
                self.queue.clear();
                self.transition(Status::Cancelled);
            }
        }
    }

    /// pending → running: freezes the difficulty and starts the countdown.
    fn start(&mut self) {
        if self.status != Status::Pending {
            self.ignore("start");
            return;
        }
        let frozen = self.difficulty;
        let budget = self.services.scheduler.compute_budget(self.steps.len(), frozen);
        self.frozen = Some(frozen);
        self.deadline = Some(self.services.scheduler.start(budget));
        self.status = Status::Running;

        self.services.bus.publish(
            Event::new(EventKind::OrderStarted)
                .with_order(&self.id)
                .with_difficulty(frozen)
                .with_budget(budget),
        );
        self.publish_snapshot();
    }

    fn set_difficulty(&mut self, level: Difficulty) {
        if self.status.is_terminal() {
            self.ignore(Signal::DifficultySet(level).as_label());
            return;
        }
        self.difficulty = level;
        self.services.bus.publish(
            Event::new(EventKind::DifficultyChanged)
                .with_order(&self.id)
                .with_difficulty(level)
                .with_status(self.status),
        );
        self.publish_snapshot();
    }

    /// Applies one validation result; a no-op once the session has left `running`.
    fn apply(&mut self, result: StepResult) {
        if self.status != Status::Running {
            return;
        }
        let StepResult { pending, accepted } = result;

        match accepted {
            Ok(true) => {
                self.completed += 1;
                if pending.perfect {
                    self.perfect += 1;
                }
                debug_assert!(self.completed as usize <= self.steps.len());
                self.services.bus.publish(
                    Event::new(EventKind::StepValidated)
                        .with_order(&self.id)
                        .with_step(pending.step.as_str())
                        .with_stats(self.stats()),
                );
            }
            Ok(false) => self.mistake(&pending, "rejected by validator".to_string(), None),
            Err(err) => {
                let bound = match &err {
                    ActivityError::Timeout { timeout } => Some(*timeout),
                    _ => None,
                };
                self.mistake(&pending, err.to_string(), bound);
            }
        }

        if self.completed as usize == self.steps.len() {
            self.transition(Status::Completed);
        } else {
            self.publish_snapshot();
        }
    }

    fn mistake(&mut self, pending: &PendingStep, reason: String, bound: Option<Duration>) {
        self.mistakes += 1;
        let mut ev = Event::new(EventKind::StepRejected)
            .with_order(&self.id)
            .with_step(pending.step.as_str())
            .with_reason(reason)
            .with_stats(self.stats());
        if let Some(bound) = bound {
            ev = ev.with_budget(bound);
        }
        self.services.bus.publish(ev);
    }

    /// Moves into a terminal status (first one wins) and stops the countdown.
    fn transition(&mut self, to: Status) {
        debug_assert!(to.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = to;
        if let Some(deadline) = &self.deadline {
            deadline.cancel();
        }
        self.publish_snapshot();
    }

    fn ignore(&self, signal: &'static str) {
        self.services.bus.publish(
            Event::new(EventKind::SignalIgnored)
                .with_order(&self.id)
                .with_status(self.status)
                .with_reason(signal),
        );
    }

    async fn report(&self, outcome: &Outcome) {
        let reporter = self.services.reporter.as_ref();
        let res = match self.services.report_timeout {
            Some(bound) => match time::timeout(bound, reporter.finish_order(outcome)).await {
                Ok(res) => res,
                Err(_elapsed) => Err(ActivityError::Timeout { timeout: bound }),
            },
            None => reporter.finish_order(outcome).await,
        };

        match res {
            Ok(()) => self.services.bus.publish(
                Event::new(EventKind::OutcomeReported)
                    .with_order(&self.id)
                    .with_level(outcome.level),
            ),
            Err(err) => {
                tracing::warn!(order = %self.id, error = %err, label = err.as_label(), "outcome report failed");
                self.services.bus.publish(
                    Event::new(EventKind::ReportFailed)
                        .with_order(&self.id)
                        .with_reason(err.to_string()),
                );
            }
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            completed_steps: self.completed,
            total_steps: self.steps.len() as u32,
            perfect_steps: self.perfect,
            mistakes: self.mistakes,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            status: self.status,
            difficulty: self.difficulty,
            frozen_difficulty: self.frozen,
            budget: self.deadline.as_ref().map(Deadline::budget),
            deadline_at: self.deadline.as_ref().map(Deadline::at),
            created_at: self.created_at,
            completed: self.completed,
            perfect: self.perfect,
            mistakes: self.mistakes,
            total_steps: self.steps.len() as u32,
            queued: self.queue.len(),
        }
    }

    fn publish_snapshot(&self) {
        self.state_tx.send_replace(self.snapshot());
    }
}
