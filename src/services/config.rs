use crate::cli::LogFormat;
use crate::domain::constants::{
    DEFAULT_APPLICATION, DEFAULT_ARGOCD_NAMESPACE, DEFAULT_CONFIG_FILE, DEFAULT_EXTRA_PATHS,
    DEFAULT_HEALTH_PATH, DEFAULT_KUBECTL, DEFAULT_NAMESPACE, DEFAULT_REGISTRY_URL,
    DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_SECS, ENV_CONFIG_DIR, MASKED_SECRET,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Check names left out of the sweep.
    pub skip: Vec<String>,
    pub registry: RegistryConfig,
    pub chart_repo: ChartRepoConfig,
    pub cluster: ClusterConfig,
    pub service: ServiceConfig,
    pub probe: ProbeConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartRepoConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub kubectl: String,
    pub context: Option<String>,
    pub namespace: String,
    pub argocd_namespace: String,
    pub application: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub url: String,
    pub health_path: String,
    pub extra_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            username: None,
            password: None,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubectl: DEFAULT_KUBECTL.to_string(),
            context: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            argocd_namespace: DEFAULT_ARGOCD_NAMESPACE.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            extra_paths: DEFAULT_EXTRA_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl VerifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout_secs.max(1))
    }

    pub fn is_skipped(&self, check: &str) -> bool {
        self.skip.iter().any(|s| s.eq_ignore_ascii_case(check))
    }

    /// Copy suitable for printing: passwords replaced, URLs normalized.
    pub fn masked(&self) -> VerifyConfig {
        let mut out = self.clone();
        out.registry.url = normalize_url(&out.registry.url);
        out.chart_repo.url = out.chart_repo.url.as_deref().map(normalize_url);
        out.service.url = normalize_url(&out.service.url);
        if out.registry.password.is_some() {
            out.registry.password = Some(MASKED_SECRET.to_string());
        }
        if out.chart_repo.password.is_some() {
            out.chart_repo.password = Some(MASKED_SECRET.to_string());
        }
        out
    }
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Environment { name: String, path: PathBuf },
    Discovered(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Discovered(p) => p.display().to_string(),
            ConfigSource::Environment { name, path } => format!("{} ({})", path.display(), name),
            ConfigSource::Defaults => "built-in defaults".to_string(),
        }
    }
}

pub fn resolve_source(explicit: Option<&Path>, environment: Option<&str>, cwd: &Path) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }
    if let Some(name) = environment {
        return ConfigSource::Environment {
            name: name.to_string(),
            path: cwd.join(ENV_CONFIG_DIR).join(format!("{}.toml", name)),
        };
    }
    let discovered = cwd.join(DEFAULT_CONFIG_FILE);
    if discovered.is_file() {
        return ConfigSource::Discovered(discovered);
    }
    ConfigSource::Defaults
}

pub fn load_file(path: &Path) -> anyhow::Result<VerifyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn load(source: &ConfigSource) -> anyhow::Result<VerifyConfig> {
    match source {
        ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => load_file(path),
        ConfigSource::Environment { name, path } => {
            if !path.is_file() {
                anyhow::bail!(
                    "environment file for '{}' not found: {}",
                    name,
                    path.display()
                );
            }
            load_file(path)
        }
        ConfigSource::Defaults => Ok(VerifyConfig::default()),
    }
}

/// Applies the variables the deployment scripts export. Empty values are ignored.
pub fn apply_env_overrides(cfg: &mut VerifyConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("REGISTRY_URL") {
        cfg.registry.url = v;
    }
    if let Some(v) = get("REGISTRY_USERNAME") {
        cfg.registry.username = Some(v);
    }
    if let Some(v) = get("REGISTRY_PASSWORD") {
        cfg.registry.password = Some(v);
    }
    if let Some(v) = get("CHARTS_URL") {
        cfg.chart_repo.url = Some(v);
    }
    if let Some(v) = get("CHARTS_USERNAME") {
        cfg.chart_repo.username = Some(v);
    }
    if let Some(v) = get("CHARTS_PASSWORD") {
        cfg.chart_repo.password = Some(v);
    }
    if let Some(v) = get("K8S_NAMESPACE") {
        cfg.cluster.namespace = v;
    }
    if let Some(v) = get("KUBE_CONTEXT") {
        cfg.cluster.context = Some(v);
    }
    if let Some(v) = get("KUBECTL") {
        cfg.cluster.kubectl = v;
    }
    if let Some(v) = get("SERVICE_URL") {
        cfg.service.url = v;
    }
    if let Some(v) = get("HEALTH_PATH") {
        cfg.service.health_path = v;
    }
}

#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub namespace: Option<String>,
    pub context: Option<String>,
    pub service_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

pub fn apply_cli_overrides(cfg: &mut VerifyConfig, o: &CliOverrides) {
    if let Some(ns) = &o.namespace {
        cfg.cluster.namespace = ns.clone();
    }
    if let Some(ctx) = &o.context {
        cfg.cluster.context = Some(ctx.clone());
    }
    if let Some(url) = &o.service_url {
        cfg.service.url = url.clone();
    }
    if let Some(level) = &o.log_level {
        cfg.log.level = level.clone();
    }
    if let Some(format) = o.log_format {
        cfg.log.format = format;
    }
}

/// `registry.jclee.me` -> `https://registry.jclee.me`, trailing slashes dropped.
pub fn normalize_url(raw: &str) -> String {
    let s = raw.trim().trim_end_matches('/');
    if s.contains("://") {
        s.to_string()
    } else {
        format!("https://{}", s)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = normalize_url(base);
    if path.is_empty() {
        return base;
    }
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

pub fn starter_toml() -> anyhow::Result<String> {
    let mut cfg = VerifyConfig::default();
    cfg.chart_repo.url = Some("https://charts.jclee.me".to_string());
    Ok(toml::to_string_pretty(&cfg)?)
}
