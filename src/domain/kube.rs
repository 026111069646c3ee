//! The slices of `kubectl -o json` output the checks read. Unknown fields are ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct KubeList<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct NodeStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl Node {
    pub fn is_ready(&self) -> bool {
        self.status
            .conditions
            .iter()
            .any(|c| c.kind == "Ready" && c.status == "True")
    }
}

#[derive(Debug, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct PodStatus {
    pub phase: Option<String>,
}

impl Pod {
    pub fn is_running(&self) -> bool {
        self.status.phase.as_deref() == Some("Running")
    }
}

#[derive(Debug, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub sync: StatusField,
    #[serde(default)]
    pub health: StatusField,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatusField {
    pub status: Option<String>,
}

impl Application {
    pub fn sync_status(&self) -> &str {
        self.status.sync.status.as_deref().unwrap_or("Unknown")
    }

    pub fn health_status(&self) -> &str {
        self.status.health.status.as_deref().unwrap_or("Unknown")
    }

    pub fn is_synced_and_healthy(&self) -> bool {
        self.sync_status() == "Synced" && self.health_status() == "Healthy"
    }
}
