use dioxus::prelude::*;

use crate::fixtures::samples::SAMPLES;
use crate::hooks::incident::use_incident_console;
use crate::models::Source;

#[component]
pub fn InputPanel() -> Element {
    let console = use_incident_console();
    let state = console.state();
    let snapshot = state.read();

    let log_value = snapshot.input.log.clone();
    let source_selected: Source = snapshot.input.source;
    let source_value = source_selected.as_str();
    let can_analyze = snapshot.can_analyze();
    let can_save = snapshot.can_save();
    let analyze_label = if snapshot.is_analyzing() {
        "Analyzing..."
    } else {
        "Analyze"
    };
    let save_label = if snapshot.is_saving() {
        "Saving..."
    } else if snapshot.persistence_enabled {
        "Save to History"
    } else {
        "DB not configured"
    };
    let error = snapshot.error.clone();
    drop(snapshot);

    rsx! {
        section { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            h2 { class: "text-sm font-semibold text-slate-800", "Input" }

            div { class: "grid grid-cols-2 gap-3 text-xs text-slate-600",
                label { class: "space-y-1",
                    span { class: "block font-medium", "Source" }
                    select {
                        class: "w-full rounded border border-slate-300 p-2 bg-white",
                        value: source_value,
                        onchange: move |evt| console.set_source(evt.value().as_str()),
                        for source in Source::ALL {
                            option {
                                key: "{source}",
                                value: source.as_str(),
                                selected: source == source_selected,
                                "{source.label()}"
                            }
                        }
                    }
                }
                div { class: "space-y-1",
                    span { class: "block font-medium", "Demo samples" }
                    div { class: "flex flex-wrap gap-2",
                        for sample in SAMPLES.iter() {
                            button {
                                key: "{sample.label}",
                                class: "rounded-full border border-slate-300 px-3 py-1 hover:bg-slate-100",
                                r#type: "button",
                                onclick: move |_| console.apply_sample(sample),
                                "{sample.label}"
                            }
                        }
                    }
                }
            }

            label { class: "block space-y-1 text-xs text-slate-600",
                span { class: "block font-medium", "Log / Error" }
                textarea {
                    class: "w-full rounded border border-slate-300 p-2 font-mono text-sm",
                    rows: "10",
                    placeholder: "e.g. psql: connection refused",
                    value: "{log_value}",
                    oninput: move |evt| console.set_log(evt.value()),
                }
            }

            div { class: "flex gap-2",
                button {
                    class: "rounded bg-slate-900 px-4 py-2 text-sm text-white disabled:opacity-40",
                    disabled: !can_analyze,
                    onclick: move |_| console.analyze(),
                    "{analyze_label}"
                }
                button {
                    class: "rounded border border-slate-300 px-4 py-2 text-sm disabled:opacity-40",
                    disabled: !can_save,
                    onclick: move |_| console.save(),
                    "{save_label}"
                }
            }

            if let Some(message) = error {
                div { class: "rounded border border-red-200 bg-red-50 p-2 text-xs text-red-600",
                    strong { "Error: " }
                    "{message}"
                }
            }
        }
    }
}
