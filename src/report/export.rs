//! CSV drill-down exports.
//!
//! Flat row types for the rollup table and the three task lists, and
//! the writer that drops them into an export directory.

use crate::models::{ClassifiedRollup, NormalizedTask, Report, TaskRecord};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// One line of the rollup table.
#[derive(Debug, Serialize)]
pub struct RollupRow<'a> {
    pub group: &'a str,
    pub task_count: usize,
    pub daily_avg: f64,
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub annual_hours: f64,
    pub monthly_load_ratio: f64,
    pub headroom_hours: f64,
    pub alert_daily: &'a str,
    pub alert_weekly: &'a str,
    pub alert_monthly: &'a str,
    pub alert_annual: &'a str,
    pub idle: &'a str,
}

/// One task line of a drill-down export.
#[derive(Debug, Serialize)]
pub struct TaskRow<'a> {
    pub row: usize,
    pub group: &'a str,
    pub stage: &'a str,
    pub activity: &'a str,
    pub duration: String,
    pub frequency: &'a str,
    pub duration_hours: Option<f64>,
    pub monthly_occurrences: Option<f64>,
    pub monthly_hours: Option<f64>,
}

impl<'a> From<&'a TaskRecord> for TaskRow<'a> {
    fn from(r: &'a TaskRecord) -> Self {
        Self {
            row: r.row,
            group: &r.group,
            stage: r.stage.as_deref().unwrap_or(""),
            activity: r.activity.as_deref().unwrap_or(""),
            duration: r.duration.to_string(),
            frequency: r.frequency.as_deref().unwrap_or(""),
            duration_hours: None,
            monthly_occurrences: None,
            monthly_hours: None,
        }
    }
}

impl<'a> From<&'a NormalizedTask> for TaskRow<'a> {
    fn from(t: &'a NormalizedTask) -> Self {
        Self {
            duration_hours: Some(t.duration_hours),
            monthly_occurrences: Some(t.monthly_occurrences),
            monthly_hours: Some(t.monthly_hours()),
            ..TaskRow::from(&t.record)
        }
    }
}

/// A flat CSV row type with its header line.
///
/// `HEADER` must list the serialized field names in declaration order;
/// it is written on its own when there are no rows.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

impl CsvRow for RollupRow<'_> {
    const HEADER: &'static [&'static str] = &[
        "group",
        "task_count",
        "daily_avg",
        "weekly_hours",
        "monthly_hours",
        "annual_hours",
        "monthly_load_ratio",
        "headroom_hours",
        "alert_daily",
        "alert_weekly",
        "alert_monthly",
        "alert_annual",
        "idle",
    ];
}

impl CsvRow for TaskRow<'_> {
    const HEADER: &'static [&'static str] = &[
        "row",
        "group",
        "stage",
        "activity",
        "duration",
        "frequency",
        "duration_hours",
        "monthly_occurrences",
        "monthly_hours",
    ];
}

fn message(flag: &crate::models::AlertFlag) -> &str {
    flag.message.as_deref().unwrap_or("")
}

/// Flatten classified rollups for CSV output.
pub fn rollup_rows(rollups: &[ClassifiedRollup]) -> Vec<RollupRow<'_>> {
    rollups
        .iter()
        .map(|r| RollupRow {
            group: &r.rollup.group,
            task_count: r.rollup.task_count,
            daily_avg: r.rollup.daily_avg,
            weekly_hours: r.rollup.weekly_hours,
            monthly_hours: r.rollup.monthly_hours,
            annual_hours: r.rollup.annual_hours,
            monthly_load_ratio: r.monthly_load_ratio,
            headroom_hours: r.headroom_hours,
            alert_daily: message(&r.alert_daily),
            alert_weekly: message(&r.alert_weekly),
            alert_monthly: message(&r.alert_monthly),
            alert_annual: message(&r.alert_annual),
            idle: message(&r.idle),
        })
        .collect()
}

/// Serialize rows as CSV with a header line taken from the row type.
///
/// An empty row set still writes the header.
pub fn write_csv<W: Write, T: CsvRow>(writer: W, rows: Vec<T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(T::HEADER)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the rollup table and the three task lists into `dir`.
///
/// Returns the paths written.
pub fn write_exports(dir: &Path, report: &Report) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let excluded: Vec<TaskRow> = report.excluded.iter().map(TaskRow::from).collect();
    let overloaded: Vec<TaskRow> = report.overloaded_tasks.iter().map(TaskRow::from).collect();
    let idle: Vec<TaskRow> = report.idle_tasks.iter().map(TaskRow::from).collect();

    let mut written = Vec::new();
    written.push(write_file(dir, "rollups.csv", rollup_rows(&report.rollups))?);
    written.push(write_file(dir, "excluded_tasks.csv", excluded)?);
    written.push(write_file(dir, "overloaded_tasks.csv", overloaded)?);
    written.push(write_file(dir, "idle_tasks.csv", idle)?);

    Ok(written)
}

fn write_file<T: CsvRow>(dir: &Path, name: &str, rows: Vec<T>) -> Result<PathBuf> {
    let path = dir.join(name);
    let count = rows.len();
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, rows).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Exported {} row(s) to {}", count, path.display());
    Ok(path)
}
