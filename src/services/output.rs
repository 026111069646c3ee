use crate::domain::constants::READY_BANNER;
use crate::domain::models::{JsonOut, Readiness, ReportSummary};
use crate::services::readiness::recommendation;
use serde::Serialize;

/// The `{"ok": true, "data": ...}` envelope every `--json` command prints.
pub fn envelope<T: Serialize>(data: T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonOut { ok: true, data })?)
}

/// One line per row, or the whole slice as a JSON envelope.
pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", envelope(data)?);
    } else {
        data.iter().for_each(|d| println!("{}", row(d)));
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    let text = if json { envelope(&data)? } else { row(&data) };
    println!("{}", text);
    Ok(())
}

pub fn render_report(report: &ReportSummary, source: &str) -> String {
    let width = report
        .results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("Deployment verification ({})\n", source);
    for r in &report.results {
        out.push_str(&format!(
            "  {} {:<width$}  {}\n",
            r.status.marker(),
            r.name,
            r.detail,
            width = width
        ));
    }
    out.push_str(&format!(
        "\npassed {}, failed {}, unknown {}\n",
        report.passed, report.failed, report.unknown
    ));
    match (&report.readiness, &report.blocking) {
        (Readiness::Ready, _) | (_, None) => {
            out.push_str(&format!("✅ READY: {}\n", READY_BANNER));
        }
        (Readiness::NotReady, Some(b)) => {
            out.push_str(&format!("❌ NOT_READY: blocked by {} ({})\n", b.check, b.detail));
            out.push_str(&format!("  next: {}\n", recommendation(b)));
        }
    }
    out
}

pub fn print_report(json: bool, report: &ReportSummary, source: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", envelope(report)?);
    } else {
        print!("{}", render_report(report, source));
    }
    Ok(())
}
