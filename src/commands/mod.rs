//! Command handler layer.
//!
//! ## Files
//! - `verify.rs` — verify/list/check.
//! - `config.rs` — config show/init.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate probing and classification to `services/*`.
//! - Keep behavior and output schema stable.

pub mod config;
pub mod verify;

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::services::config::{
    apply_cli_overrides, apply_env_overrides, load, resolve_source, CliOverrides, ConfigSource,
    VerifyConfig,
};
use crate::services::telemetry::init_tracing;
use anyhow::Context;
use std::process::ExitCode;

pub struct Session {
    pub cfg: VerifyConfig,
    pub source: ConfigSource,
}

pub fn load_session(cli: &Cli) -> anyhow::Result<Session> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let source = resolve_source(cli.config.as_deref(), cli.environment.as_deref(), &cwd);
    let mut cfg = load(&source)?;
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    apply_cli_overrides(
        &mut cfg,
        &CliOverrides {
            namespace: cli.namespace.clone(),
            context: cli.context.clone(),
            service_url: cli.service_url.clone(),
            log_level: cli.log_level.clone(),
            log_format: cli.log_format,
        },
    );
    Ok(Session { cfg, source })
}

pub fn dispatch(cli: &Cli) -> anyhow::Result<ExitCode> {
    if let Commands::Config {
        command: ConfigCommands::Init { path, force },
    } = &cli.command
    {
        config::handle_init(cli.json, path, *force)?;
        return Ok(ExitCode::SUCCESS);
    }

    let session = load_session(cli)?;
    init_tracing(&session.cfg.log);
    tracing::debug!(source = %session.source.describe(), "configuration loaded");

    match &cli.command {
        Commands::Verify { fail_on_not_ready } => {
            verify::handle_verify(cli.json, &session, *fail_on_not_ready)
        }
        Commands::List => verify::handle_list(cli.json, &session).map(|_| ExitCode::SUCCESS),
        Commands::Check { name } => {
            verify::handle_check(cli.json, &session, name).map(|_| ExitCode::SUCCESS)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                config::handle_show(cli.json, &session).map(|_| ExitCode::SUCCESS)
            }
            ConfigCommands::Init { .. } => Ok(ExitCode::SUCCESS),
        },
    }
}
