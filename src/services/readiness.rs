use crate::domain::models::{
    BlockingFailure, CheckResult, CheckStatus, Gate, Readiness, ReportSummary,
};

pub fn build_report(results: Vec<CheckResult>) -> ReportSummary {
    let count = |s: CheckStatus| results.iter().filter(|r| r.status == s).count();
    let passed = count(CheckStatus::Ok);
    let failed = count(CheckStatus::Fail);
    let unknown = count(CheckStatus::Unknown);

    let blocking = first_blocking(&results);
    let readiness = if blocking.is_none() {
        Readiness::Ready
    } else {
        Readiness::NotReady
    };

    ReportSummary {
        readiness,
        blocking,
        passed,
        failed,
        unknown,
        results,
    }
}

/// Walks the gates in declared order and stops at the first one that either
/// did not pass or never ran.
fn first_blocking(results: &[CheckResult]) -> Option<BlockingFailure> {
    Gate::ALL.iter().find_map(|gate| {
        match results.iter().find(|r| r.gate == Some(*gate)) {
            Some(r) if r.status == CheckStatus::Ok => None,
            Some(r) => Some(BlockingFailure {
                check: r.name.clone(),
                gate: *gate,
                detail: r.detail.clone(),
            }),
            None => Some(BlockingFailure {
                check: gate.label().to_string(),
                gate: *gate,
                detail: "check did not run".to_string(),
            }),
        }
    })
}

pub fn recommendation(blocking: &BlockingFailure) -> &'static str {
    match blocking.gate {
        Gate::Registry => "Check registry credentials (REGISTRY_USERNAME/REGISTRY_PASSWORD) and that the registry answers GET /v2/.",
        Gate::Cluster => "Check kubeconfig/context and that the Kubernetes API server is reachable.",
        Gate::Pods => "Inspect workload pods: kubectl describe pods and kubectl logs in the target namespace.",
        Gate::Health => "Check the service URL and that the health endpoint answers HTTP 200 within the timeout.",
    }
}
