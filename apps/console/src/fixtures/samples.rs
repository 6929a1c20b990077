use crate::models::Source;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoSample {
    pub label: &'static str,
    pub source: Source,
    pub log: &'static str,
}

pub static SAMPLES: [DemoSample; 4] = [
    DemoSample {
        label: "DB error",
        source: Source::Backend,
        log: "psql: connection refused",
    },
    DemoSample {
        label: "Timeout",
        source: Source::Ci,
        log: "Request timed out after 30s, retry attempt 2",
    },
    DemoSample {
        label: "Auth",
        source: Source::Nginx,
        log: "403 Forbidden: permission denied",
    },
    DemoSample {
        label: "Config",
        source: Source::K8s,
        log: "invalid config: missing API_KEY",
    },
];

