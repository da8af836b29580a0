//! Data models for workload analysis.
//!
//! This module contains the core data structures that flow through the
//! pipeline: raw task records, normalized tasks, group rollups, the
//! threshold configuration they are classified against, and the report.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WorkloadError};

/// Raw duration cell as it was found in the input table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawDuration {
    /// Empty cell.
    Missing,
    /// A proper time-of-day value.
    TimeOfDay(NaiveTime),
    /// Anything else; parsed leniently as `H:M:S`.
    Text(String),
}

impl RawDuration {
    /// Classify a cell. Blank cells are missing, valid clock times are
    /// time-of-day values, everything else is kept as text.
    pub fn from_cell(cell: Option<&str>) -> Self {
        let Some(raw) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
            return RawDuration::Missing;
        };

        // chrono reads `:60` seconds as a leap second; those go through
        // the integer H:M:S path instead.
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
            .filter(|t| t.nanosecond() < 1_000_000_000)
            .map(RawDuration::TimeOfDay)
            .unwrap_or_else(|| RawDuration::Text(raw.to_string()))
    }
}

impl fmt::Display for RawDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDuration::Missing => Ok(()),
            RawDuration::TimeOfDay(t) => write!(f, "{}", t.format("%H:%M:%S")),
            RawDuration::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    /// 1-based data row number in the input (header excluded).
    pub row: usize,
    /// Grouping key; missing values carry the configured sentinel.
    pub group: String,
    /// Stage label, used for row selection only.
    pub stage: Option<String>,
    /// Activity label, used for row selection only.
    pub activity: Option<String>,
    /// Duration as read.
    pub duration: RawDuration,
    /// Frequency label exactly as read.
    pub frequency: Option<String>,
}

impl TaskRecord {
    /// Whether the row has a usable frequency label.
    pub fn has_frequency(&self) -> bool {
        self.frequency
            .as_deref()
            .is_some_and(|f| !f.trim().is_empty())
    }
}

/// A task record with its derived hour figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTask {
    #[serde(flatten)]
    pub record: TaskRecord,
    /// Frequency label after trim + lowercase.
    pub frequency_label: String,
    /// Duration of one occurrence, in decimal hours.
    pub duration_hours: f64,
    /// Expected occurrences per month; 0 for unrecognized labels.
    pub monthly_occurrences: f64,
}

impl NormalizedTask {
    /// Hours this task contributes per month.
    pub fn monthly_hours(&self) -> f64 {
        self.duration_hours * self.monthly_occurrences
    }
}

/// Which column tasks are grouped by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Job role / function (default)
    #[default]
    Role,
    /// Task category
    Category,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Role => write!(f, "role"),
            GroupBy::Category => write!(f, "category"),
        }
    }
}

/// Horizon used to decide whether a group is idle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum IdleCriterion {
    /// Compare monthly hours against the monthly limit (default)
    #[default]
    Monthly,
    /// Compare weekly hours against the weekly limit
    Weekly,
}

impl fmt::Display for IdleCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdleCriterion::Monthly => write!(f, "monthly"),
            IdleCriterion::Weekly => write!(f, "weekly"),
        }
    }
}

/// Which groups are shown in the rollup table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every group (default)
    #[default]
    All,
    /// Only groups above the monthly limit
    Overloaded,
    /// Only groups flagged idle
    Idle,
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Overloaded => write!(f, "overloaded only"),
            StatusFilter::Idle => write!(f, "idle only"),
        }
    }
}

/// Limits a rollup is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub limit_daily: f64,
    pub limit_weekly: f64,
    pub limit_monthly: f64,
    pub limit_annual: f64,
    pub idle_criterion: IdleCriterion,
    pub idle_fraction: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            limit_daily: 9.0,
            limit_weekly: 44.0,
            limit_monthly: 176.0,
            limit_annual: 2112.0,
            idle_criterion: IdleCriterion::Monthly,
            idle_fraction: 0.8,
        }
    }
}

impl Thresholds {
    /// Check that every limit is a positive number and the idle
    /// fraction lies in (0, 1].
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("limit_daily", self.limit_daily),
            ("limit_weekly", self.limit_weekly),
            ("limit_monthly", self.limit_monthly),
            ("limit_annual", self.limit_annual),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value <= 0.0 {
                return Err(WorkloadError::InvalidThreshold { name, value });
            }
        }

        if !(self.idle_fraction > 0.0 && self.idle_fraction <= 1.0) {
            return Err(WorkloadError::InvalidIdleFraction(self.idle_fraction));
        }

        Ok(())
    }

    /// Limit that applies to the chosen idleness horizon.
    pub fn idle_limit(&self) -> f64 {
        match self.idle_criterion {
            IdleCriterion::Monthly => self.limit_monthly,
            IdleCriterion::Weekly => self.limit_weekly,
        }
    }
}

/// Aggregated hours for one grouping-key value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRollup {
    pub group: String,
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub annual_hours: f64,
    pub task_count: usize,
    pub daily_avg: f64,
}

impl GroupRollup {
    /// A rollup with every numeric field at zero.
    pub fn empty(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            weekly_hours: 0.0,
            monthly_hours: 0.0,
            annual_hours: 0.0,
            task_count: 0,
            daily_avg: 0.0,
        }
    }

    /// Whether the group has neither hours nor tasks.
    pub fn is_zero(&self) -> bool {
        self.monthly_hours <= 0.0 && self.task_count == 0
    }
}

/// A boolean flag with the message shown when it fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertFlag {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AlertFlag {
    /// Build a flag that carries `message` only when `active`.
    pub fn when(active: bool, message: impl Into<String>) -> Self {
        Self {
            active,
            message: active.then(|| message.into()),
        }
    }

    /// Short marker for tables.
    pub fn marker(&self) -> &'static str {
        if self.active {
            "⚠️"
        } else {
            ""
        }
    }
}

/// A rollup together with its threshold flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRollup {
    #[serde(flatten)]
    pub rollup: GroupRollup,
    pub alert_daily: AlertFlag,
    pub alert_weekly: AlertFlag,
    pub alert_monthly: AlertFlag,
    pub alert_annual: AlertFlag,
    pub idle: AlertFlag,
    /// Monthly limit minus monthly hours; negative when overloaded.
    pub headroom_hours: f64,
    /// Monthly hours as a fraction of the monthly limit.
    pub monthly_load_ratio: f64,
}

impl ClassifiedRollup {
    /// Whether any of the four overload alerts fired.
    pub fn any_alert(&self) -> bool {
        self.alert_daily.active
            || self.alert_weekly.active
            || self.alert_monthly.active
            || self.alert_annual.active
    }
}

/// A frequency label the resolver did not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedFrequency {
    /// Normalized label.
    pub label: String,
    /// Number of rows carrying it.
    pub rows: usize,
}

/// Counts over the classified rollups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadSummary {
    pub groups: usize,
    pub overloaded_daily: usize,
    pub overloaded_weekly: usize,
    pub overloaded_monthly: usize,
    pub overloaded_annual: usize,
    pub idle: usize,
    pub total_monthly_hours: f64,
}

impl LoadSummary {
    /// Creates a summary from a list of classified rollups.
    pub fn from_rollups(rollups: &[ClassifiedRollup]) -> Self {
        let mut summary = Self {
            groups: rollups.len(),
            ..Self::default()
        };

        for r in rollups {
            summary.overloaded_daily += usize::from(r.alert_daily.active);
            summary.overloaded_weekly += usize::from(r.alert_weekly.active);
            summary.overloaded_monthly += usize::from(r.alert_monthly.active);
            summary.overloaded_annual += usize::from(r.alert_annual.active);
            summary.idle += usize::from(r.idle.active);
            summary.total_monthly_hours += r.rollup.monthly_hours;
        }

        summary
    }
}

/// Metadata about one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the task table.
    pub input: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Grouping dimension used.
    pub group_by: GroupBy,
    /// Rows read after row selection.
    pub rows_read: usize,
    /// Rows that made it into the rollups.
    pub rows_aggregated: usize,
    /// Rows excluded for lacking a frequency.
    pub rows_excluded: usize,
    /// Status filter applied to the displayed table.
    pub status_filter: StatusFilter,
    /// Whether all-zero groups were hidden from the displayed table.
    pub hide_zero: bool,
}

/// The complete workload report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub thresholds: Thresholds,
    /// Summary over every group, regardless of display filters.
    pub summary: LoadSummary,
    /// Rollups after the status filter and hide-zero option.
    pub rollups: Vec<ClassifiedRollup>,
    /// Rows with no frequency.
    pub excluded: Vec<TaskRecord>,
    /// Tasks of groups above the monthly limit.
    pub overloaded_tasks: Vec<NormalizedTask>,
    /// Tasks of groups flagged idle.
    pub idle_tasks: Vec<NormalizedTask>,
    pub unrecognized_frequencies: Vec<UnrecognizedFrequency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(group: &str, monthly: bool, idle: bool) -> ClassifiedRollup {
        ClassifiedRollup {
            rollup: GroupRollup {
                monthly_hours: 10.0,
                ..GroupRollup::empty(group)
            },
            alert_daily: AlertFlag::default(),
            alert_weekly: AlertFlag::default(),
            alert_monthly: AlertFlag::when(monthly, "above monthly limit"),
            alert_annual: AlertFlag::default(),
            idle: AlertFlag::when(idle, "idle"),
            headroom_hours: 0.0,
            monthly_load_ratio: 0.0,
        }
    }

    #[test]
    fn test_raw_duration_classification() {
        assert_eq!(RawDuration::from_cell(None), RawDuration::Missing);
        assert_eq!(RawDuration::from_cell(Some("   ")), RawDuration::Missing);
        assert_eq!(
            RawDuration::from_cell(Some("02:30:00")),
            RawDuration::TimeOfDay(NaiveTime::from_hms_opt(2, 30, 0).unwrap())
        );
        assert_eq!(
            RawDuration::from_cell(Some("1:15")),
            RawDuration::TimeOfDay(NaiveTime::from_hms_opt(1, 15, 0).unwrap())
        );
        assert_eq!(
            RawDuration::from_cell(Some("30:00:00")),
            RawDuration::Text("30:00:00".to_string())
        );
    }

    #[test]
    fn test_leap_second_cells_stay_text() {
        assert_eq!(
            RawDuration::from_cell(Some("23:59:60")),
            RawDuration::Text("23:59:60".to_string())
        );
        assert_eq!(
            RawDuration::from_cell(Some("00:00:60")),
            RawDuration::Text("00:00:60".to_string())
        );
    }

    #[test]
    fn test_raw_duration_display() {
        let t = RawDuration::from_cell(Some("2:05:00"));
        assert_eq!(t.to_string(), "02:05:00");
        assert_eq!(RawDuration::Missing.to_string(), "");
    }

    #[test]
    fn test_has_frequency() {
        let mut record = TaskRecord {
            row: 1,
            group: "Analyst".to_string(),
            stage: None,
            activity: None,
            duration: RawDuration::Missing,
            frequency: Some("  ".to_string()),
        };
        assert!(!record.has_frequency());
        record.frequency = Some("Mensal".to_string());
        assert!(record.has_frequency());
        record.frequency = None;
        assert!(!record.has_frequency());
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(Thresholds::default().validate().is_ok());

        let bad = Thresholds {
            limit_weekly: 0.0,
            ..Thresholds::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(WorkloadError::InvalidThreshold {
                name: "limit_weekly",
                ..
            })
        ));

        let bad = Thresholds {
            idle_fraction: 1.5,
            ..Thresholds::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(WorkloadError::InvalidIdleFraction(_))
        ));

        let edge = Thresholds {
            idle_fraction: 1.0,
            ..Thresholds::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_idle_limit_follows_criterion() {
        let mut t = Thresholds::default();
        assert_eq!(t.idle_limit(), 176.0);
        t.idle_criterion = IdleCriterion::Weekly;
        assert_eq!(t.idle_limit(), 44.0);
    }

    #[test]
    fn test_alert_flag_message_only_when_active() {
        assert_eq!(AlertFlag::when(false, "x").message, None);
        assert_eq!(AlertFlag::when(true, "x").message.as_deref(), Some("x"));
    }

    #[test]
    fn test_load_summary() {
        let rollups = vec![
            classified("A", true, false),
            classified("B", false, true),
            classified("C", false, true),
        ];

        let summary = LoadSummary::from_rollups(&rollups);
        assert_eq!(summary.groups, 3);
        assert_eq!(summary.overloaded_monthly, 1);
        assert_eq!(summary.idle, 2);
        assert_eq!(summary.total_monthly_hours, 30.0);
    }
}
