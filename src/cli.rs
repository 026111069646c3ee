use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "deploy-verify",
    version,
    about = "Verify a GitOps deployment: registry, chart repo, cluster, workloads and service health"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        short,
        long,
        global = true,
        help = "Config file (TOML). Overrides --env and ./deploy-verify.toml"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        short,
        long = "env",
        global = true,
        help = "Environment name; loads deploy/<env>.toml"
    )]
    pub environment: Option<String>,
    #[arg(long, global = true, help = "Kubernetes namespace of the workload")]
    pub namespace: Option<String>,
    #[arg(long, global = true, help = "kubectl context to query")]
    pub context: Option<String>,
    #[arg(long, global = true, help = "Base URL of the deployed service")]
    pub service_url: Option<String>,
    #[arg(long, global = true, help = "Log filter (error, warn, info, debug, trace)")]
    pub log_level: Option<String>,
    #[arg(long, global = true, value_enum, help = "Log line format on stderr")]
    pub log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every check in order and print the readiness report
    Verify {
        #[arg(long, default_value_t = false, help = "Exit with code 2 when NOT_READY")]
        fail_on_not_ready: bool,
    },
    /// List checks in execution order
    List,
    /// Run a single check by name
    Check { name: String },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets masked
    Show,
    /// Write a starter config file
    Init {
        #[arg(long, default_value = "deploy-verify.toml")]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
