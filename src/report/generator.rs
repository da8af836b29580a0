//! Report generation.
//!
//! This module renders a [`Report`] as Markdown, JSON or a CSV rollup
//! table. Rendering only formats what the analysis produced; nothing is
//! recomputed here.

use crate::models::{
    ClassifiedRollup, LoadSummary, NormalizedTask, Report, ReportMetadata, TaskRecord, Thresholds,
    UnrecognizedFrequency,
};
use crate::report::export::{rollup_rows, write_csv};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Workload Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_thresholds_section(&report.thresholds));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_rollup_section(report));
    output.push_str(&generate_alerts_section(&report.rollups));
    output.push_str(&generate_overload_tasks_section(&report.overloaded_tasks));
    output.push_str(&generate_excluded_section(&report.excluded));
    output.push_str(&generate_unrecognized_section(
        &report.unrecognized_frequencies,
    ));

    // Footer
    output.push_str("---\n\n*Report generated by workload*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Grouped By:** {}\n", metadata.group_by));
    section.push_str(&format!("- **Rows Read:** {}\n", metadata.rows_read));
    section.push_str(&format!(
        "- **Rows Aggregated:** {}\n",
        metadata.rows_aggregated
    ));
    if metadata.rows_excluded > 0 {
        section.push_str(&format!(
            "- **Rows Without Frequency:** {}\n",
            metadata.rows_excluded
        ));
    }
    section.push_str(&format!("- **Showing:** {}", metadata.status_filter));
    if metadata.hide_zero {
        section.push_str(", zero groups hidden");
    }
    section.push_str("\n\n");

    section
}

/// Generate the thresholds section.
fn generate_thresholds_section(t: &Thresholds) -> String {
    let mut section = String::new();

    section.push_str("## Limits\n\n");
    section.push_str("| Daily | Weekly | Monthly | Annual | Idle Below |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {}h | {}h | {}h | {}h | {:.0}% of {} |\n\n",
        t.limit_daily,
        t.limit_weekly,
        t.limit_monthly,
        t.limit_annual,
        t.idle_fraction * 100.0,
        t.idle_criterion
    ));

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &LoadSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Groups | Over Daily | Over Weekly | Over Monthly | Over Annual | Idle |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} |\n\n",
        summary.groups,
        summary.overloaded_daily,
        summary.overloaded_weekly,
        summary.overloaded_monthly,
        summary.overloaded_annual,
        summary.idle
    ));
    section.push_str(&format!(
        "Total recurring load: **{:.1}h/month**\n\n",
        summary.total_monthly_hours
    ));

    section
}

/// Generate the rollup table.
fn generate_rollup_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Load by {}\n\n", report.metadata.group_by));

    if report.rollups.is_empty() {
        section.push_str("No groups match the current filters.\n\n");
        return section;
    }

    section.push_str(
        "| Group | Tasks | Daily Avg | Weekly | Monthly | Annual | % Monthly Limit | Headroom | D | W | M | A | Idle |\n",
    );
    section.push_str("|:---|:---:|---:|---:|---:|---:|---:|---:|:---:|:---:|:---:|:---:|:---:|\n");

    for r in &report.rollups {
        section.push_str(&generate_rollup_row(r));
    }
    section.push_str("\n");

    section
}

fn generate_rollup_row(r: &ClassifiedRollup) -> String {
    let g = &r.rollup;
    format!(
        "| {} | {} | {:.2} | {:.1} | {:.1} | {:.1} | {:.0}% | {:.1} | {} | {} | {} | {} | {} |\n",
        g.group,
        g.task_count,
        g.daily_avg,
        g.weekly_hours,
        g.monthly_hours,
        g.annual_hours,
        r.monthly_load_ratio * 100.0,
        r.headroom_hours,
        r.alert_daily.marker(),
        r.alert_weekly.marker(),
        r.alert_monthly.marker(),
        r.alert_annual.marker(),
        if r.idle.active { "🟢" } else { "" },
    )
}

/// Generate the per-group alert messages.
fn generate_alerts_section(rollups: &[ClassifiedRollup]) -> String {
    let flagged: Vec<_> = rollups
        .iter()
        .filter(|r| r.any_alert() || r.idle.active)
        .collect();
    if flagged.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Alerts\n\n");

    for r in flagged {
        let messages: Vec<&str> = [
            &r.alert_daily,
            &r.alert_weekly,
            &r.alert_monthly,
            &r.alert_annual,
            &r.idle,
        ]
        .into_iter()
        .filter_map(|flag| flag.message.as_deref())
        .collect();

        section.push_str(&format!(
            "- **{}**: {}\n",
            r.rollup.group,
            messages.join("; ")
        ));
    }
    section.push_str("\n");

    section
}

/// Generate the drill-down of tasks behind monthly overload.
fn generate_overload_tasks_section(tasks: &[NormalizedTask]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Tasks Contributing to Overload\n\n");
    section.push_str("| Row | Group | Stage | Activity | Duration (h) | Frequency | Hours/Month |\n");
    section.push_str("|---:|:---|:---|:---|---:|:---|---:|\n");

    for t in tasks {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.2} | {} | {:.1} |\n",
            t.record.row,
            t.record.group,
            t.record.stage.as_deref().unwrap_or("-"),
            t.record.activity.as_deref().unwrap_or("-"),
            t.duration_hours,
            t.frequency_label,
            t.monthly_hours()
        ));
    }
    section.push_str("\n");

    section
}

/// Generate the list of rows ignored for lacking a frequency.
fn generate_excluded_section(excluded: &[TaskRecord]) -> String {
    if excluded.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Tasks Ignored for Missing Frequency\n\n");
    section.push_str("| Row | Group | Stage | Activity | Duration |\n");
    section.push_str("|---:|:---|:---|:---|:---|\n");

    for r in excluded {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            r.row,
            r.group,
            r.stage.as_deref().unwrap_or("-"),
            r.activity.as_deref().unwrap_or("-"),
            r.duration
        ));
    }
    section.push_str("\n");

    section
}

/// Generate the list of frequency labels that counted as zero.
fn generate_unrecognized_section(labels: &[UnrecognizedFrequency]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Unrecognized Frequencies\n\n");
    section.push_str("These labels contributed zero hours. Fix them in the source table.\n\n");
    for u in labels {
        section.push_str(&format!("- `{}` ({} row(s))\n", u.label, u.rows));
    }
    section.push_str("\n");

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the displayed rollup table as CSV.
pub fn generate_csv_report(report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rollup_rows(&report.rollups))?;
    Ok(String::from_utf8(buf)?)
}
