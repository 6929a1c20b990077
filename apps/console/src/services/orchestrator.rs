//! Sequencing of the analyze / save / refresh channels over one incident slot.
//!
//! Every method takes `&self` so several operations can be in flight on the
//! same task set. State lives in a [`RefCell`] that is only borrowed between
//! awaits; each transition is applied in one borrow and then pushed to the
//! observer, so readers never see a half-applied update.

use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{IncidentAnalyzer, IncidentStore, HISTORY_LIMIT};
use crate::fixtures::samples::DemoSample;
use crate::models::{NewIncidentRecord, Source};
use crate::state::{IncidentState, OperationStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotConfigured,
    Busy,
    InputTooShort,
    NoDecision,
    AlreadyMounted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotConfigured => "not configured",
            Self::Busy => "already in progress",
            Self::InputTooShort => "log is too short",
            Self::NoDecision => "no decision to save",
            Self::AlreadyMounted => "already mounted",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationOutcome {
    Completed,
    Failed(String),
    Skipped(SkipReason),
}

type Observer = Box<dyn Fn(&IncidentState)>;

pub struct IncidentOrchestrator<A, S> {
    analyzer: A,
    store: Option<S>,
    state: RefCell<IncidentState>,
    observer: RefCell<Option<Observer>>,
    mounted: Cell<bool>,
    refresh_requeued: Cell<bool>,
}

impl<A, S> IncidentOrchestrator<A, S>
where
    A: IncidentAnalyzer,
    S: IncidentStore,
{
    /// `store = None` switches save and history off for the whole session.
    pub fn new(analyzer: A, store: Option<S>) -> Self {
        let state = IncidentState::new(store.is_some());
        Self {
            analyzer,
            store,
            state: RefCell::new(state),
            observer: RefCell::new(None),
            mounted: Cell::new(false),
            refresh_requeued: Cell::new(false),
        }
    }

    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(&IncidentState) + 'static,
    {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn snapshot(&self) -> IncidentState {
        self.state.borrow().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn set_log(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.set_log(text));
    }

    pub fn set_source(&self, source: Source) {
        self.update(|state| state.set_source(source));
    }

    /// Does not cancel in-flight requests; their results still land when they arrive.
    pub fn apply_sample(&self, sample: &DemoSample) {
        self.update(|state| state.apply_sample(sample));
    }

    /// Initial history load. Runs once per orchestrator.
    pub async fn mount(&self) -> OperationOutcome {
        if self.mounted.replace(true) {
            return OperationOutcome::Skipped(SkipReason::AlreadyMounted);
        }
        self.refresh_history().await
    }

    pub async fn analyze(&self) -> OperationOutcome {
        let dispatched = {
            let state = self.state.borrow();
            if state.is_analyzing() {
                Err(SkipReason::Busy)
            } else if !state.log_is_long_enough() {
                Err(SkipReason::InputTooShort)
            } else {
                Ok(())
            }
        };
        if let Err(reason) = dispatched {
            debug!(%reason, "analyze rejected");
            return OperationOutcome::Skipped(reason);
        }

        let (input, revision) = self.update(|state| {
            state.analyze_status = OperationStatus::Analyzing;
            state.error = None;
            state.result = None;
            (state.input.clone(), state.input_revision)
        });
        info!(source = %input.source, "analysis dispatched");

        let response = self.analyzer.analyze(&input).await;

        if self.state.borrow().input_revision != revision {
            debug!(revision, "analysis settled for input that has since been edited");
        }

        match response {
            Ok(decision) => {
                if decision.is_none() {
                    debug!("analysis returned an empty body");
                }
                self.update(|state| {
                    state.result = decision;
                    state.analyze_status = OperationStatus::Idle;
                });
                OperationOutcome::Completed
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    status = ?err.status(),
                    transport = err.is_transport(),
                    "analysis failed: {message}"
                );
                self.update(|state| {
                    state.result = None;
                    state.error = Some(message.clone());
                    state.analyze_status = OperationStatus::Idle;
                });
                OperationOutcome::Failed(message)
            }
        }
    }

    /// Inserts the current decision, then reloads history so the new row is
    /// visible before the save channel goes idle.
    pub async fn save(&self) -> OperationOutcome {
        let Some(store) = self.store.as_ref() else {
            return OperationOutcome::Skipped(SkipReason::NotConfigured);
        };

        let record = {
            let state = self.state.borrow();
            if state.is_saving() {
                Err(SkipReason::Busy)
            } else if let Some(decision) = state.result.as_ref() {
                Ok(NewIncidentRecord::from_decision(&state.input, decision))
            } else {
                Err(SkipReason::NoDecision)
            }
        };
        let record = match record {
            Ok(record) => record,
            Err(reason) => {
                debug!(%reason, "save rejected");
                return OperationOutcome::Skipped(reason);
            }
        };

        self.update(|state| {
            state.save_status = OperationStatus::Saving;
            state.error = None;
        });
        info!(source = %record.source, "saving incident");

        if let Err(err) = store.insert(&record).await {
            let message = err.to_string();
            warn!(status = ?err.status(), "save failed: {message}");
            self.update(|state| {
                state.error = Some(message.clone());
                state.save_status = OperationStatus::Idle;
            });
            return OperationOutcome::Failed(message);
        }

        if self.refresh_history().await == OperationOutcome::Skipped(SkipReason::Busy) {
            // The running refresh fetches once more before it goes idle.
            self.refresh_requeued.set(true);
        }

        self.update(|state| state.save_status = OperationStatus::Idle);
        OperationOutcome::Completed
    }

    /// Replaces `history` wholesale with the newest rows from the store.
    pub async fn refresh_history(&self) -> OperationOutcome {
        let Some(store) = self.store.as_ref() else {
            self.update(|state| state.history_error = None);
            return OperationOutcome::Skipped(SkipReason::NotConfigured);
        };

        if self.state.borrow().is_refreshing() {
            return OperationOutcome::Skipped(SkipReason::Busy);
        }

        self.update(|state| {
            state.refresh_status = OperationStatus::Refreshing;
            state.history_error = None;
        });

        let outcome = loop {
            let outcome = match store.list_recent(HISTORY_LIMIT).await {
                Ok(rows) => {
                    debug!(count = rows.len(), "history refreshed");
                    self.update(|state| {
                        state.history = rows;
                        state.history_error = None;
                    });
                    OperationOutcome::Completed
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(status = ?err.status(), "history refresh failed: {message}");
                    self.update(|state| state.history_error = Some(message.clone()));
                    OperationOutcome::Failed(message)
                }
            };

            if !self.refresh_requeued.replace(false) {
                break outcome;
            }
        };

        self.update(|state| state.refresh_status = OperationStatus::Idle);
        outcome
    }

    fn update<R>(&self, apply: impl FnOnce(&mut IncidentState) -> R) -> R {
        let result = apply(&mut self.state.borrow_mut());
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&self.state.borrow());
        }
        result
    }
}
