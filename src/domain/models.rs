use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Fail,
    Unknown,
}

impl CheckStatus {
    pub fn marker(self) -> &'static str {
        match self {
            CheckStatus::Ok => "✅",
            CheckStatus::Fail => "❌",
            CheckStatus::Unknown => "⚠️",
        }
    }
}

/// Readiness prerequisites. A run is only READY when every gate passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    Registry,
    Cluster,
    Pods,
    Health,
}

impl Gate {
    pub const ALL: [Gate; 4] = [Gate::Registry, Gate::Cluster, Gate::Pods, Gate::Health];

    pub fn label(self) -> &'static str {
        match self {
            Gate::Registry => "registry",
            Gate::Cluster => "cluster",
            Gate::Pods => "pods",
            Gate::Health => "health",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub target: String,
    pub status: CheckStatus,
    pub detail: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Readiness {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "NOT_READY")]
    NotReady,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockingFailure {
    pub check: String,
    pub gate: Gate,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub readiness: Readiness,
    pub blocking: Option<BlockingFailure>,
    pub passed: usize,
    pub failed: usize,
    pub unknown: usize,
    pub results: Vec<CheckResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckListing {
    pub position: usize,
    pub name: String,
    pub target: String,
    pub gate: Option<Gate>,
    pub skipped: bool,
}
