//! Service layer containing probing logic and side-effect helpers.
//!
//! ## Service map
//! - `config.rs` — config file/env/flag resolution.
//! - `probe.rs` — single-shot HTTP and kubectl access, error taxonomy.
//! - `checks.rs` — the typed checks and their fixed order.
//! - `runner.rs` — sequential execution into check results.
//! - `readiness.rs` — READY/NOT_READY classification.
//! - `output.rs` — JSON/text output helpers.
//! - `telemetry.rs` — tracing subscriber setup.
//!
//! ## Conventions
//! - Checks never write to the systems they inspect.
//! - Probe errors become results; only config problems abort a command.
//! - Keep command handlers thin; delegate to services.

pub mod checks;
pub mod config;
pub mod output;
pub mod probe;
pub mod readiness;
pub mod runner;
pub mod telemetry;
