use crate::domain::models::{CheckListing, CheckResult};
use crate::services::checks::{Check, Probes};
use std::time::Instant;

/// Runs one check and records its outcome. Never fails: every probe error
/// has already been folded into the verdict.
pub fn run_check(check: &dyn Check, probes: &Probes) -> CheckResult {
    let name = check.name();
    let target = check.target();
    tracing::debug!(check = %name, %target, "starting check");

    let started = Instant::now();
    let verdict = check.run(probes);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    tracing::info!(
        check = %name,
        status = ?verdict.status,
        elapsed_ms,
        detail = %verdict.detail,
        "check finished"
    );

    CheckResult {
        name,
        target,
        status: verdict.status,
        detail: verdict.detail,
        elapsed_ms,
        gate: check.gate(),
    }
}

/// Runs every non-skipped check in declared order. A failing check never
/// stops the sweep.
pub fn run_all(
    checks: &[Box<dyn Check>],
    probes: &Probes,
    is_skipped: impl Fn(&str) -> bool,
) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(checks.len());
    for check in checks {
        if is_skipped(&check.name()) {
            tracing::info!(check = %check.name(), "skipped by configuration");
            continue;
        }
        results.push(run_check(&**check, probes));
    }
    results
}

/// Skip entries that name no planned check. Each one is logged, since a typo
/// there silently runs the check it meant to skip.
pub fn unmatched_skips<'a>(checks: &[Box<dyn Check>], skip: &'a [String]) -> Vec<&'a str> {
    let unmatched: Vec<&str> = skip
        .iter()
        .map(String::as_str)
        .filter(|s| !checks.iter().any(|c| c.name().eq_ignore_ascii_case(s)))
        .collect();
    for name in &unmatched {
        tracing::warn!(skip = %name, "skip entry matches no check");
    }
    unmatched
}

pub fn find<'a>(checks: &'a [Box<dyn Check>], name: &str) -> Option<&'a dyn Check> {
    checks
        .iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
        .map(|c| &**c)
}

pub fn listing(checks: &[Box<dyn Check>], is_skipped: impl Fn(&str) -> bool) -> Vec<CheckListing> {
    checks
        .iter()
        .enumerate()
        .map(|(i, c)| CheckListing {
            position: i + 1,
            name: c.name(),
            target: c.target(),
            gate: c.gate(),
            skipped: is_skipped(&c.name()),
        })
        .collect()
}
