use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod domain;
mod services;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    commands::dispatch(&cli)
}
