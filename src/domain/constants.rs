pub const DEFAULT_REGISTRY_URL: &str = "registry.jclee.me";
pub const DEFAULT_NAMESPACE: &str = "blacklist";
pub const DEFAULT_ARGOCD_NAMESPACE: &str = "argocd";
pub const DEFAULT_APPLICATION: &str = "blacklist";
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:32542";
pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_EXTRA_PATHS: [&str; 2] = ["/api/stats", "/api/collection/status"];
pub const DEFAULT_KUBECTL: &str = "kubectl";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_CONFIG_FILE: &str = "deploy-verify.toml";
pub const ENV_CONFIG_DIR: &str = "deploy";

pub const READY_BANNER: &str = "GitOps CI/CD Pipeline 완료";
pub const MASKED_SECRET: &str = "********";
