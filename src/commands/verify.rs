use crate::commands::Session;
use crate::domain::models::{CheckListing, Readiness};
use crate::services::checks::{plan, Probes};
use crate::services::output::{print_one, print_out, print_report};
use crate::services::probe::{KubectlProbe, ReqwestProbe};
use crate::services::readiness::build_report;
use crate::services::runner::{find, listing, run_all, run_check, unmatched_skips};
use std::process::ExitCode;

/// Exit code for `verify --fail-on-not-ready` when the verdict is NOT_READY.
const NOT_READY_EXIT: u8 = 2;

struct LiveProbes {
    http: ReqwestProbe,
    cluster: KubectlProbe,
}

impl LiveProbes {
    fn new(session: &Session) -> anyhow::Result<Self> {
        let cfg = &session.cfg;
        Ok(Self {
            http: ReqwestProbe::new(cfg.timeout())?,
            cluster: KubectlProbe::new(
                &cfg.cluster.kubectl,
                cfg.cluster.context.as_deref(),
                cfg.timeout(),
            ),
        })
    }

    fn probes(&self) -> Probes<'_> {
        Probes {
            http: &self.http,
            cluster: &self.cluster,
        }
    }
}

pub fn handle_verify(
    json: bool,
    session: &Session,
    fail_on_not_ready: bool,
) -> anyhow::Result<ExitCode> {
    let live = LiveProbes::new(session)?;
    let checks = plan(&session.cfg);
    unmatched_skips(&checks, &session.cfg.skip);
    let results = run_all(&checks, &live.probes(), |n| session.cfg.is_skipped(n));
    let report = build_report(results);
    tracing::info!(
        readiness = ?report.readiness,
        passed = report.passed,
        failed = report.failed,
        unknown = report.unknown,
        "verification finished"
    );
    print_report(json, &report, &session.source.describe())?;

    if fail_on_not_ready && report.readiness == Readiness::NotReady {
        return Ok(ExitCode::from(NOT_READY_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_list(json: bool, session: &Session) -> anyhow::Result<()> {
    let checks = plan(&session.cfg);
    unmatched_skips(&checks, &session.cfg.skip);
    let rows: Vec<CheckListing> = listing(&checks, |n| session.cfg.is_skipped(n));
    print_out(json, &rows, |c| {
        let gate = c.gate.map(|g| g.label()).unwrap_or("-");
        let skipped = if c.skipped { "\tskipped" } else { "" };
        format!("{}\t{}\t{}\t{}{}", c.position, c.name, gate, c.target, skipped)
    })
}

pub fn handle_check(json: bool, session: &Session, name: &str) -> anyhow::Result<()> {
    let checks = plan(&session.cfg);
    let Some(check) = find(&checks, name) else {
        let known: Vec<String> = checks.iter().map(|c| c.name()).collect();
        anyhow::bail!("unknown check: {} (known: {})", name, known.join(", "));
    };
    let live = LiveProbes::new(session)?;
    let result = run_check(check, &live.probes());
    print_one(json, result, |r| {
        format!("{} {}\t{}\t{}", r.status.marker(), r.name, r.target, r.detail)
    })
}
