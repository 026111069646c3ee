use crate::domain::kube::{Application, KubeList, Node, Pod, Service};
use crate::domain::models::{CheckStatus, Gate};
use crate::services::config::{join_url, VerifyConfig};
use crate::services::probe::{BasicAuth, ClusterProbe, HttpProbe, ProbeError};

/// External collaborators a check may call. Each check uses at most one call.
pub struct Probes<'a> {
    pub http: &'a dyn HttpProbe,
    pub cluster: &'a dyn ClusterProbe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: CheckStatus,
    pub detail: String,
}

impl Verdict {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Unknown,
            detail: detail.into(),
        }
    }
}

impl From<ProbeError> for Verdict {
    fn from(e: ProbeError) -> Self {
        if e.is_inconclusive() {
            Verdict::unknown(e.to_string())
        } else {
            Verdict::fail(e.to_string())
        }
    }
}

pub trait Check {
    fn name(&self) -> String;
    fn target(&self) -> String;
    fn gate(&self) -> Option<Gate> {
        None
    }
    fn run(&self, probes: &Probes) -> Verdict;
}

/// The fixed verification order. Skipped checks are still listed so
/// `list` can show them; the runner leaves them out.
pub fn plan(cfg: &VerifyConfig) -> Vec<Box<dyn Check>> {
    let ns = cfg.cluster.namespace.clone();
    let mut checks: Vec<Box<dyn Check>> = vec![
        Box::new(RegistryCheck {
            url: join_url(&cfg.registry.url, "/v2/"),
            auth: BasicAuth::from_parts(
                cfg.registry.username.as_ref(),
                cfg.registry.password.as_ref(),
            ),
        }),
        Box::new(ChartRepoCheck {
            url: cfg
                .chart_repo
                .url
                .as_deref()
                .map(|u| join_url(u, "/api/charts")),
            auth: BasicAuth::from_parts(
                cfg.chart_repo.username.as_ref(),
                cfg.chart_repo.password.as_ref(),
            ),
        }),
        Box::new(ClusterCheck),
        Box::new(NamespaceCheck {
            namespace: ns.clone(),
        }),
        Box::new(PodsCheck {
            namespace: ns.clone(),
        }),
        Box::new(ServicesCheck { namespace: ns }),
        Box::new(ArgoApplicationCheck {
            namespace: cfg.cluster.argocd_namespace.clone(),
            application: cfg.cluster.application.clone(),
        }),
        Box::new(EndpointCheck {
            name: "health".to_string(),
            url: join_url(&cfg.service.url, &cfg.service.health_path),
            gate: Some(Gate::Health),
        }),
    ];
    for path in &cfg.service.extra_paths {
        checks.push(Box::new(EndpointCheck {
            name: format!("endpoint:{}", path),
            url: join_url(&cfg.service.url, path),
            gate: None,
        }));
    }
    checks
}

pub struct RegistryCheck {
    pub url: String,
    pub auth: Option<BasicAuth>,
}

impl Check for RegistryCheck {
    fn name(&self) -> String {
        "registry".to_string()
    }

    fn target(&self) -> String {
        format!("GET {}", self.url)
    }

    fn gate(&self) -> Option<Gate> {
        Some(Gate::Registry)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let resp = match probes.http.get(&self.url, self.auth.as_ref()) {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        match resp.status {
            401 | 403 => {
                return Verdict::fail(format!(
                    "authentication rejected (HTTP {}); check registry credentials",
                    resp.status
                ))
            }
            s if !resp.is_success() => return Verdict::fail(format!("HTTP {}", s)),
            _ => {}
        }
        match serde_json::from_str::<serde_json::Value>(&resp.body) {
            Ok(v) if v.is_object() => {
                Verdict::ok(format!("registry API v2 answered HTTP {}", resp.status))
            }
            _ => ProbeError::UnexpectedResponse {
                target: self.url.clone(),
                reason: "/v2/ did not return a JSON object".to_string(),
            }
            .into(),
        }
    }
}

pub struct ChartRepoCheck {
    pub url: Option<String>,
    pub auth: Option<BasicAuth>,
}

impl Check for ChartRepoCheck {
    fn name(&self) -> String {
        "chart-repo".to_string()
    }

    fn target(&self) -> String {
        match &self.url {
            Some(u) => format!("GET {}", u),
            None => "(not configured)".to_string(),
        }
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let Some(url) = &self.url else {
            return Verdict::unknown("no chart repository configured");
        };
        let resp = match probes.http.get(url, self.auth.as_ref()) {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        if !resp.is_success() {
            return Verdict::fail(format!("HTTP {}", resp.status));
        }
        // ChartMuseum serves a map keyed by chart name; other servers a plain array.
        match serde_json::from_str::<serde_json::Value>(&resp.body) {
            Ok(serde_json::Value::Array(charts)) => {
                Verdict::ok(format!("{} charts published", charts.len()))
            }
            Ok(serde_json::Value::Object(charts)) => {
                Verdict::ok(format!("{} charts published", charts.len()))
            }
            _ => ProbeError::UnexpectedResponse {
                target: url.clone(),
                reason: "chart index is not a JSON list".to_string(),
            }
            .into(),
        }
    }
}

fn parse_list<T: serde::de::DeserializeOwned>(raw: &str) -> Result<Vec<T>, Verdict> {
    serde_json::from_str::<KubeList<T>>(raw)
        .map(|l| l.items)
        .map_err(|e| Verdict::fail(format!("unreadable kubectl output: {}", e)))
}

pub struct ClusterCheck;

impl ClusterCheck {
    const ARGS: [&'static str; 4] = ["get", "nodes", "-o", "json"];
}

impl Check for ClusterCheck {
    fn name(&self) -> String {
        "cluster".to_string()
    }

    fn target(&self) -> String {
        format!("kubectl {}", Self::ARGS.join(" "))
    }

    fn gate(&self) -> Option<Gate> {
        Some(Gate::Cluster)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let raw = match probes.cluster.query(&Self::ARGS) {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let nodes: Vec<Node> = match parse_list(&raw) {
            Ok(n) => n,
            Err(v) => return v,
        };
        let ready = nodes.iter().filter(|n| n.is_ready()).count();
        if ready < nodes.len() {
            let not_ready: Vec<&str> = nodes
                .iter()
                .filter(|n| !n.is_ready())
                .map(|n| n.metadata.name.as_str())
                .collect();
            tracing::warn!(nodes = ?not_ready, "cluster has nodes that are not Ready");
        }
        Verdict::ok(format!("{} nodes, {} Ready", nodes.len(), ready))
    }
}

pub struct NamespaceCheck {
    pub namespace: String,
}

impl Check for NamespaceCheck {
    fn name(&self) -> String {
        "namespace".to_string()
    }

    fn target(&self) -> String {
        format!("kubectl get namespace {} -o name", self.namespace)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        match probes
            .cluster
            .query(&["get", "namespace", self.namespace.as_str(), "-o", "name"])
        {
            Ok(_) => Verdict::ok(format!("namespace {} exists", self.namespace)),
            Err(ProbeError::NotFound { .. }) => {
                Verdict::fail(format!("namespace {} not found", self.namespace))
            }
            Err(e) => e.into(),
        }
    }
}

pub struct PodsCheck {
    pub namespace: String,
}

impl Check for PodsCheck {
    fn name(&self) -> String {
        "pods".to_string()
    }

    fn target(&self) -> String {
        format!("kubectl get pods -n {} -o json", self.namespace)
    }

    fn gate(&self) -> Option<Gate> {
        Some(Gate::Pods)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let raw = match probes
            .cluster
            .query(&["get", "pods", "-n", self.namespace.as_str(), "-o", "json"])
        {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let pods: Vec<Pod> = match parse_list(&raw) {
            Ok(p) => p,
            Err(v) => return v,
        };
        let running = pods.iter().filter(|p| p.is_running()).count();
        if running == 0 {
            let phases: Vec<String> = pods
                .iter()
                .map(|p| {
                    format!(
                        "{}={}",
                        p.metadata.name,
                        p.status.phase.as_deref().unwrap_or("Unknown")
                    )
                })
                .collect();
            let mut detail = format!(
                "no Running pods in {} ({} total)",
                self.namespace,
                pods.len()
            );
            if !phases.is_empty() {
                detail.push_str(&format!(": {}", phases.join(", ")));
            }
            return Verdict::fail(detail);
        }
        Verdict::ok(format!("{}/{} pods Running", running, pods.len()))
    }
}

pub struct ServicesCheck {
    pub namespace: String,
}

impl Check for ServicesCheck {
    fn name(&self) -> String {
        "services".to_string()
    }

    fn target(&self) -> String {
        format!("kubectl get services -n {} -o json", self.namespace)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let raw = match probes
            .cluster
            .query(&["get", "services", "-n", self.namespace.as_str(), "-o", "json"])
        {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let services: Vec<Service> = match parse_list(&raw) {
            Ok(s) => s,
            Err(v) => return v,
        };
        if services.is_empty() {
            return Verdict::fail(format!("no services in {}", self.namespace));
        }
        let names: Vec<&str> = services.iter().map(|s| s.metadata.name.as_str()).collect();
        Verdict::ok(names.join(", "))
    }
}

pub struct ArgoApplicationCheck {
    pub namespace: String,
    pub application: String,
}

impl Check for ArgoApplicationCheck {
    fn name(&self) -> String {
        "argocd".to_string()
    }

    fn target(&self) -> String {
        format!("kubectl get applications -n {} -o json", self.namespace)
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let raw = match probes
            .cluster
            .query(&["get", "applications", "-n", self.namespace.as_str(), "-o", "json"])
        {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let apps: Vec<Application> = match parse_list(&raw) {
            Ok(a) => a,
            Err(v) => return v,
        };
        let Some(app) = apps.iter().find(|a| a.metadata.name == self.application) else {
            return Verdict::fail(format!(
                "application {} not found in {} ({} applications)",
                self.application,
                self.namespace,
                apps.len()
            ));
        };
        let detail = format!(
            "{}: sync={} health={}",
            app.metadata.name,
            app.sync_status(),
            app.health_status()
        );
        if app.is_synced_and_healthy() {
            Verdict::ok(detail)
        } else {
            Verdict::fail(detail)
        }
    }
}

pub struct EndpointCheck {
    pub name: String,
    pub url: String,
    pub gate: Option<Gate>,
}

impl Check for EndpointCheck {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn target(&self) -> String {
        format!("GET {}", self.url)
    }

    fn gate(&self) -> Option<Gate> {
        self.gate
    }

    fn run(&self, probes: &Probes) -> Verdict {
        let resp = match probes.http.get(&self.url, None) {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let reported = serde_json::from_str::<serde_json::Value>(&resp.body)
            .ok()
            .and_then(|v| v.get("status").and_then(|s| s.as_str()).map(str::to_string));
        let detail = match reported {
            Some(s) => format!("HTTP {} (status: {})", resp.status, s),
            None => format!("HTTP {}", resp.status),
        };
        if resp.is_success() {
            Verdict::ok(detail)
        } else {
            Verdict::fail(detail)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{nodes_json, pods_json, FakeCluster, FakeHttp};
    use super::*;

    fn probes<'a>(http: &'a FakeHttp, cluster: &'a FakeCluster) -> Probes<'a> {
        Probes { http, cluster }
    }

    #[test]
    fn plan_keeps_declared_order() {
        let names: Vec<String> = plan(&VerifyConfig::default())
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "registry",
                "chart-repo",
                "cluster",
                "namespace",
                "pods",
                "services",
                "argocd",
                "health",
                "endpoint:/api/stats",
                "endpoint:/api/collection/status",
            ]
        );
    }

    #[test]
    fn registry_requires_json_object() {
        let check = RegistryCheck {
            url: "https://registry.jclee.me/v2/".to_string(),
            auth: None,
        };
        let cluster = FakeCluster::default();

        let http = FakeHttp::default().with(&check.url, 200, "{}");
        assert_eq!(check.run(&probes(&http, &cluster)).status, CheckStatus::Ok);

        let http = FakeHttp::default().with(&check.url, 200, "<html>proxy</html>");
        assert_eq!(check.run(&probes(&http, &cluster)).status, CheckStatus::Fail);

        let http = FakeHttp::default().with(&check.url, 401, "{}");
        let v = check.run(&probes(&http, &cluster));
        assert_eq!(v.status, CheckStatus::Fail);
        assert!(v.detail.contains("401"));
    }

    #[test]
    fn unreachable_registry_fails_without_panicking() {
        let check = RegistryCheck {
            url: "https://registry.invalid/v2/".to_string(),
            auth: None,
        };
        let http = FakeHttp::default().failing(
            &check.url,
            ProbeError::Timeout {
                target: check.url.clone(),
                secs: 5,
            },
        );
        let cluster = FakeCluster::default();
        let v = check.run(&probes(&http, &cluster));
        assert_eq!(v.status, CheckStatus::Fail);
        assert!(v.detail.contains("5s"));
    }

    #[test]
    fn chart_repo_unconfigured_is_unknown() {
        let check = ChartRepoCheck {
            url: None,
            auth: None,
        };
        let http = FakeHttp::default();
        let cluster = FakeCluster::default();
        assert_eq!(check.run(&probes(&http, &cluster)).status, CheckStatus::Unknown);
        assert!(http.calls.borrow().is_empty());
    }

    #[test]
    fn chart_repo_accepts_array_and_rejects_scalar() {
        let url = "https://charts.jclee.me/api/charts".to_string();
        let check = ChartRepoCheck {
            url: Some(url.clone()),
            auth: None,
        };
        let cluster = FakeCluster::default();
        let http = FakeHttp::default().with(&url, 200, r#"[{"name":"blacklist"}]"#);
        let v = check.run(&probes(&http, &cluster));
        assert_eq!(v, Verdict::ok("1 charts published"));

        let http = FakeHttp::default().with(&url, 200, "\"nope\"");
        assert_eq!(check.run(&probes(&http, &cluster)).status, CheckStatus::Fail);
    }

    #[test]
    fn cluster_counts_ready_nodes() {
        let http = FakeHttp::default();
        let cluster = FakeCluster::default().with("nodes", &nodes_json(&[true, false]));
        assert_eq!(
            ClusterCheck.run(&probes(&http, &cluster)),
            Verdict::ok("2 nodes, 1 Ready")
        );
    }

    #[test]
    fn missing_kubectl_is_unknown() {
        let http = FakeHttp::default();
        let cluster = FakeCluster::default().failing(
            "nodes",
            ProbeError::ToolMissing {
                tool: "kubectl".to_string(),
            },
        );
        assert_eq!(
            ClusterCheck.run(&probes(&http, &cluster)).status,
            CheckStatus::Unknown
        );
    }

    #[test]
    fn namespace_not_found_is_reported() {
        let http = FakeHttp::default();
        let cluster = FakeCluster::default().failing(
            "namespace",
            ProbeError::NotFound {
                resource: "namespaces \"blacklist\" not found".to_string(),
            },
        );
        let v = NamespaceCheck {
            namespace: "blacklist".to_string(),
        }
        .run(&probes(&http, &cluster));
        assert_eq!(v, Verdict::fail("namespace blacklist not found"));
    }

    #[test]
    fn pods_need_one_running() {
        let http = FakeHttp::default();
        let check = PodsCheck {
            namespace: "blacklist".to_string(),
        };

        let cluster = FakeCluster::default().with("pods", &pods_json(&["Running", "Pending"]));
        assert_eq!(
            check.run(&probes(&http, &cluster)),
            Verdict::ok("1/2 pods Running")
        );

        let cluster = FakeCluster::default().with("pods", &pods_json(&["CrashLoopBackOff"]));
        let v = check.run(&probes(&http, &cluster));
        assert_eq!(v.status, CheckStatus::Fail);
        assert!(v.detail.contains("blacklist-0=CrashLoopBackOff"));

        let cluster = FakeCluster::default().with("pods", r#"{"items":[]}"#);
        assert_eq!(
            check.run(&probes(&http, &cluster)),
            Verdict::fail("no Running pods in blacklist (0 total)")
        );

        let cluster = FakeCluster::default().with("pods", "No resources found");
        let v = check.run(&probes(&http, &cluster));
        assert!(v.detail.starts_with("unreadable kubectl output"));
    }

    #[test]
    fn argocd_application_must_be_synced_and_healthy() {
        let http = FakeHttp::default();
        let check = ArgoApplicationCheck {
            namespace: "argocd".to_string(),
            application: "blacklist".to_string(),
        };
        let apps = serde_json::json!({"items": [
            {"metadata": {"name": "blacklist"},
             "status": {"sync": {"status": "OutOfSync"}, "health": {"status": "Healthy"}}}
        ]})
        .to_string();
        let cluster = FakeCluster::default().with("applications", &apps);
        assert_eq!(
            check.run(&probes(&http, &cluster)),
            Verdict::fail("blacklist: sync=OutOfSync health=Healthy")
        );

        let cluster = FakeCluster::default().with("applications", r#"{"items":[]}"#);
        let v = check.run(&probes(&http, &cluster));
        assert!(v.detail.contains("not found in argocd"));
    }

    #[test]
    fn endpoint_reports_body_status() {
        let url = "http://127.0.0.1:32542/health".to_string();
        let check = EndpointCheck {
            name: "health".to_string(),
            url: url.clone(),
            gate: Some(Gate::Health),
        };
        let cluster = FakeCluster::default();

        let http = FakeHttp::default().with(&url, 200, r#"{"status":"ok"}"#);
        assert_eq!(
            check.run(&probes(&http, &cluster)),
            Verdict::ok("HTTP 200 (status: ok)")
        );

        let http = FakeHttp::default().with(&url, 503, "upstream unavailable");
        assert_eq!(
            check.run(&probes(&http, &cluster)),
            Verdict::fail("HTTP 503")
        );
    }
}
