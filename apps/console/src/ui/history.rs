use dioxus::prelude::*;

use crate::hooks::incident::use_incident_console;
use crate::models::{IncidentRecord, MISSING_FIELD};

#[derive(Clone, Debug, PartialEq)]
struct HistoryRow {
    key: String,
    time: String,
    source: String,
    incident_type: String,
    severity: String,
    team: String,
    confidence: String,
    log: String,
}

impl From<&IncidentRecord> for HistoryRow {
    fn from(record: &IncidentRecord) -> Self {
        let text = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| MISSING_FIELD.to_string())
        };
        Self {
            key: record.id.to_string(),
            time: record.created_at_label(),
            source: text(&record.source),
            incident_type: text(&record.incident_type),
            severity: text(&record.severity),
            team: text(&record.team),
            confidence: record.confidence_label(),
            log: text(&record.log),
        }
    }
}

#[component]
pub fn HistoryPanel() -> Element {
    let console = use_incident_console();
    let state = console.state();
    let snapshot = state.read();
    let enabled = snapshot.persistence_enabled;
    let refreshing = snapshot.is_refreshing();
    let history_error = snapshot.history_error.clone();
    let rows: Vec<HistoryRow> = snapshot.history.iter().map(HistoryRow::from).collect();
    drop(snapshot);

    let refresh_label = if refreshing { "Refreshing..." } else { "Refresh" };

    rsx! {
        section { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            header { class: "flex items-center justify-between",
                h2 { class: "text-sm font-semibold text-slate-800", "History" }
                button {
                    class: "rounded border border-slate-300 px-3 py-1 text-xs disabled:opacity-40",
                    disabled: !enabled || refreshing,
                    onclick: move |_| console.refresh(),
                    "{refresh_label}"
                }
            }

            if !enabled {
                p { class: "text-xs text-slate-500",
                    "Set "
                    code { "INCIDENT_SUPABASE_URL" }
                    " and "
                    code { "INCIDENT_SUPABASE_ANON_KEY" }
                    " to enable saved history."
                }
            }

            if let Some(message) = history_error {
                div { class: "rounded border border-red-200 bg-red-50 p-2 text-xs text-red-600",
                    strong { "Error: " }
                    "{message}"
                }
            }

            if enabled {
                div { class: "overflow-auto",
                    table { class: "w-full text-left text-xs text-slate-700",
                        thead {
                            tr { class: "text-slate-500",
                                th { class: "p-2", "Time" }
                                th { class: "p-2", "Source" }
                                th { class: "p-2", "Type" }
                                th { class: "p-2", "Severity" }
                                th { class: "p-2", "Team" }
                                th { class: "p-2", "Conf" }
                                th { class: "p-2", "Log" }
                            }
                        }
                        tbody {
                            for row in rows.iter() {
                                tr { key: "{row.key}", class: "border-t border-slate-100",
                                    td { class: "p-2 whitespace-nowrap", "{row.time}" }
                                    td { class: "p-2", "{row.source}" }
                                    td { class: "p-2", "{row.incident_type}" }
                                    td { class: "p-2", "{row.severity}" }
                                    td { class: "p-2", "{row.team}" }
                                    td { class: "p-2", "{row.confidence}" }
                                    td { class: "p-2 min-w-[360px] font-mono", "{row.log}" }
                                }
                            }
                            if rows.is_empty() {
                                tr {
                                    td { class: "p-2 text-slate-500 italic", colspan: "7",
                                        "No saved incidents yet. Run “Analyze” then “Save to History”."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
