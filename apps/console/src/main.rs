#![allow(non_snake_case)]

mod api;
mod config;
mod fixtures;
mod hooks;
mod models;
mod services;
mod state;
mod ui;

use config::{AppConfig, AppProfile};
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use hooks::incident::{use_api_health, use_incident_console_provider, ConsoleBootstrap};
use tracing::{error, info};
use ui::decision::DecisionPanel;
use ui::history::HistoryPanel;
use ui::input::InputPanel;

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    init_logging(config.profile);

    match bootstrap_infrastructure(config) {
        Ok(bootstrap) => dioxus::LaunchBuilder::new()
            .with_context(bootstrap)
            .launch(App),
        Err(err) => error!(?err, "incident console bootstrap failed"),
    }
}

fn init_logging(profile: AppProfile) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = dioxus_logger::init(profile.log_level());
    });
}

fn bootstrap_infrastructure(config: AppConfig) -> anyhow::Result<ConsoleBootstrap> {
    let bootstrap = ConsoleBootstrap::new(config)?;
    info!(
        api_base_url = bootstrap.predict.base_url(),
        persistence = bootstrap.config.persistence_enabled(),
        "incident clients initialized"
    );
    Ok(bootstrap)
}

#[component]
fn App() -> Element {
    let bootstrap = use_context::<ConsoleBootstrap>();
    use_incident_console_provider(&bootstrap);

    rsx! {
        div { class: "relative",
            Router::<Route> {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[route("/")]
    Console {},
}

#[component]
fn Console() -> Element {
    let bootstrap = use_context::<ConsoleBootstrap>();
    let api_endpoint = bootstrap.config.api_base_url.clone();
    let health = use_api_health(bootstrap.predict.clone());
    let health_label = health.read().label();

    rsx! {
        div { class: "app-shell mx-auto max-w-6xl space-y-4 p-4",
            header { class: "flex flex-wrap items-start justify-between gap-4 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                div {
                    h1 { class: "text-xl font-semibold text-slate-900", "Incident Decision Engine" }
                    p { class: "text-sm text-slate-600",
                        "Paste a log line or error message. Get a structured, automation-ready incident decision."
                    }
                }
                div { class: "rounded-full border border-slate-300 px-3 py-1 text-xs text-slate-600",
                    "API "
                    code { "{api_endpoint}" }
                    " · {health_label}"
                }
            }
            main { class: "grid gap-4 md:grid-cols-2",
                InputPanel {}
                DecisionPanel {}
                div { class: "md:col-span-2",
                    HistoryPanel {}
                }
            }
            footer { class: "text-center text-xs text-slate-400",
                "v1 • deterministic decisions • ML-backed classification"
            }
        }
    }
}
