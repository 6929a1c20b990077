use dioxus::prelude::*;

use crate::hooks::incident::use_incident_console;
use crate::models::Decision;

#[component]
pub fn DecisionPanel() -> Element {
    let console = use_incident_console();
    let state = console.state();
    let snapshot = state.read();
    let result = snapshot.result.clone();
    let analyzing = snapshot.is_analyzing();
    drop(snapshot);

    let body = match result {
        Some(decision) => render_decision(&decision),
        None => {
            let hint = if analyzing {
                "Waiting for response…"
            } else {
                "Run an analysis to see the incident decision."
            };
            rsx! { p { class: "text-xs text-slate-500 italic", "{hint}" } }
        }
    };

    rsx! {
        section { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            h2 { class: "text-sm font-semibold text-slate-800", "Decision" }
            {body}
        }
    }
}

fn render_decision(decision: &Decision) -> Element {
    let incident_type = decision.display_field("incident_type");
    let severity = decision.display_field("severity");
    let team = decision.display_field("team");
    let confidence = decision.confidence_label();
    let action = decision.display_field("action");
    let raw_json = decision.pretty_json();

    rsx! {
        div { class: "flex flex-wrap gap-2 text-xs",
            span { class: "rounded-full bg-slate-100 px-3 py-1", "Type: {incident_type}" }
            span { class: "rounded-full bg-slate-100 px-3 py-1", "Severity: {severity}" }
            span { class: "rounded-full bg-slate-100 px-3 py-1", "Team: {team}" }
            span { class: "rounded-full bg-slate-100 px-3 py-1", "Confidence: {confidence}" }
        }
        div { class: "space-y-1",
            h3 { class: "text-xs font-semibold text-slate-700", "Recommended action" }
            p { class: "text-sm text-slate-800", "{action}" }
        }
        details { class: "text-xs text-slate-600",
            summary { "Raw JSON" }
            pre { class: "overflow-auto rounded bg-slate-50 p-2", "{raw_json}" }
        }
    }
}
