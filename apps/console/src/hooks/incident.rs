use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{debug, info, warn};

use crate::api::{HistoryClient, PredictClient};
use crate::config::AppConfig;
use crate::fixtures::samples::DemoSample;
use crate::models::Source;
use crate::services::orchestrator::{IncidentOrchestrator, OperationOutcome};
use crate::state::IncidentState;

pub type ConsoleOrchestrator = IncidentOrchestrator<PredictClient, HistoryClient>;

/// Clients built before launch and handed to the root component.
#[derive(Clone)]
pub struct ConsoleBootstrap {
    pub config: AppConfig,
    pub predict: PredictClient,
    pub history: Option<HistoryClient>,
}

impl ConsoleBootstrap {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let predict = PredictClient::new(&config)?;
        let history = HistoryClient::from_app_config(&config)?;
        Ok(Self {
            config,
            predict,
            history,
        })
    }
}

/// Copyable handle the panels use to read state and dispatch operations.
#[derive(Clone, Copy)]
pub struct IncidentConsole {
    orchestrator: CopyValue<Rc<ConsoleOrchestrator>>,
    view: Signal<IncidentState>,
}

impl IncidentConsole {
    pub fn state(&self) -> Signal<IncidentState> {
        self.view
    }

    pub fn set_log(&self, text: String) {
        self.orchestrator.read().set_log(text);
    }

    pub fn set_source(&self, raw: &str) {
        match raw.parse::<Source>() {
            Ok(source) => self.orchestrator.read().set_source(source),
            Err(err) => warn!("ignoring source selection: {err}"),
        }
    }

    pub fn apply_sample(&self, sample: &DemoSample) {
        debug!(sample = sample.label, "demo sample applied");
        self.orchestrator.read().apply_sample(sample);
    }

    pub fn analyze(&self) {
        let orchestrator = self.orchestrator.cloned();
        spawn(async move {
            report("analyze", orchestrator.analyze().await);
        });
    }

    pub fn save(&self) {
        let orchestrator = self.orchestrator.cloned();
        spawn(async move {
            report("save", orchestrator.save().await);
        });
    }

    pub fn refresh(&self) {
        let orchestrator = self.orchestrator.cloned();
        spawn(async move {
            report("refresh", orchestrator.refresh_history().await);
        });
    }
}

fn report(operation: &str, outcome: OperationOutcome) {
    match outcome {
        OperationOutcome::Completed => debug!(operation, "operation completed"),
        OperationOutcome::Failed(message) => debug!(operation, %message, "operation failed"),
        OperationOutcome::Skipped(reason) => debug!(operation, %reason, "operation skipped"),
    }
}

/// Builds the orchestrator once, mirrors its state into a signal and loads
/// history on mount.
pub fn use_incident_console_provider(bootstrap: &ConsoleBootstrap) -> IncidentConsole {
    let orchestrator = use_hook(|| {
        Rc::new(IncidentOrchestrator::new(
            bootstrap.predict.clone(),
            bootstrap.history.clone(),
        ))
    });

    let view = use_signal({
        let orchestrator = Rc::clone(&orchestrator);
        move || orchestrator.snapshot()
    });

    let console = use_hook({
        let orchestrator = Rc::clone(&orchestrator);
        move || {
            orchestrator.set_observer(move |state| {
                let mut view = view;
                view.set(state.clone());
            });
            IncidentConsole {
                orchestrator: CopyValue::new(orchestrator),
                view,
            }
        }
    });

    use_context_provider(|| console);

    use_future(move || {
        let orchestrator = Rc::clone(&orchestrator);
        async move {
            TimeoutFuture::new(0).await;
            let outcome = orchestrator.mount().await;
            info!(
                persistence = orchestrator.is_configured(),
                ?outcome,
                "incident history mounted"
            );
        }
    });

    console
}

pub fn use_incident_console() -> IncidentConsole {
    use_context::<IncidentConsole>()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiHealth {
    Checking,
    Reachable,
    Degraded(String),
    Unreachable,
}

impl ApiHealth {
    pub fn label(&self) -> String {
        match self {
            Self::Checking => "checking…".to_string(),
            Self::Reachable => "ok".to_string(),
            Self::Degraded(status) => format!("status: {status}"),
            Self::Unreachable => "unreachable".to_string(),
        }
    }
}

/// Probes `/health` once; failures only affect the header badge.
pub fn use_api_health(predict: PredictClient) -> Signal<ApiHealth> {
    let health = use_signal(|| ApiHealth::Checking);

    use_future(move || {
        let predict = predict.clone();
        let mut health = health;
        async move {
            let next = match predict.health().await {
                Ok(status) if status.is_ok() => ApiHealth::Reachable,
                Ok(status) => ApiHealth::Degraded(status.status),
                Err(err) => {
                    warn!(base_url = predict.base_url(), "api health probe failed: {err}");
                    ApiHealth::Unreachable
                }
            };
            health.set(next);
        }
    });

    health
}
