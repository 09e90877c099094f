use crate::domain::entities::check_result::CheckResult;
use crate::domain::entities::report::CheckReport;

/// The single status line: `<LABEL> - <summary>` plus performance data.
#[must_use]
pub fn status_line(report: &CheckReport) -> String {
    let summary = single_line(&report.summary);
    let perf = perfdata(report);
    if perf.is_empty() {
        format!("{} - {summary}", report.severity.label())
    } else {
        format!("{} - {summary} | {perf}", report.severity.label())
    }
}

/// Space-separated `label=value[uom];warn;crit;min;` entries for every result
/// that got as far as a measurement.
#[must_use]
pub fn perfdata(report: &CheckReport) -> String {
    report
        .results
        .iter()
        .filter_map(perf_entry)
        .collect::<Vec<_>>()
        .join(" ")
}

fn perf_entry(result: &CheckResult) -> Option<String> {
    let measurement = result.measurement?;
    let label = if result.name.is_empty() {
        measurement.label().to_string()
    } else {
        perf_label(&result.name)
    };
    let level = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
    Some(format!(
        "{label}={}{};{};{};0;",
        measurement.value_string(),
        measurement.unit(),
        level(result.thresholds.warning),
        level(result.thresholds.critical),
    ))
}

/// Labels may not contain `=`, `'` or `|`; labels with spaces are quoted.
fn perf_label(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '=' | '\'' | '|') { '_' } else { c })
        .collect();
    if cleaned.contains(' ') {
        format!("'{cleaned}'")
    } else {
        cleaned
    }
}

/// Monitoring systems read only the first line of plugin output, and
/// everything after a `|` on it as performance data.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "/")
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &CheckReport, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(status_line(report))
    }
}
