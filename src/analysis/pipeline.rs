//! End-to-end analysis run.
//!
//! raw records -> normalized tasks -> group rollups -> classified rollups.
//! Each run starts from the loaded records and the current thresholds;
//! nothing is cached between runs.

use crate::analysis::classify::classify_all;
use crate::analysis::frequency::Frequency;
use crate::analysis::normalize::{normalize, partition};
use crate::analysis::rollup::{distinct_groups, rollup};
use crate::models::{
    ClassifiedRollup, NormalizedTask, StatusFilter, TaskRecord, Thresholds, UnrecognizedFrequency,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Everything a run produces for the reporting layer.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// One classified rollup per distinct group of the input.
    pub rollups: Vec<ClassifiedRollup>,
    /// Rows without a frequency label; never aggregated.
    pub excluded: Vec<TaskRecord>,
    /// Rows that were aggregated.
    pub tasks: Vec<NormalizedTask>,
    /// Labels that resolved to zero occurrences.
    pub unrecognized_frequencies: Vec<UnrecognizedFrequency>,
}

/// Run the full pipeline over `records`.
pub fn analyze(records: Vec<TaskRecord>, thresholds: &Thresholds) -> AnalysisOutput {
    // Key universe comes from the records before frequency filtering.
    let groups = distinct_groups(&records);

    let split = partition(records);
    if !split.without_frequency.is_empty() {
        warn!(
            "{} row(s) have no frequency and were excluded from aggregation",
            split.without_frequency.len()
        );
    }

    let tasks: Vec<NormalizedTask> = split.with_frequency.into_iter().map(normalize).collect();
    let unrecognized_frequencies = unrecognized(&tasks);
    for u in &unrecognized_frequencies {
        warn!(
            "Unrecognized frequency '{}' on {} row(s); counted as zero hours",
            u.label, u.rows
        );
    }

    let rollups = classify_all(rollup(&tasks, &groups), thresholds);
    debug!(
        "Aggregated {} task(s) into {} group(s), {} excluded",
        tasks.len(),
        rollups.len(),
        split.without_frequency.len()
    );

    AnalysisOutput {
        rollups,
        excluded: split.without_frequency,
        tasks,
        unrecognized_frequencies,
    }
}

fn unrecognized(tasks: &[NormalizedTask]) -> Vec<UnrecognizedFrequency> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for task in tasks {
        if !Frequency::from_label(&task.frequency_label).is_recognized() {
            *counts.entry(task.frequency_label.as_str()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(label, rows)| UnrecognizedFrequency {
            label: label.to_string(),
            rows,
        })
        .collect()
}

impl AnalysisOutput {
    /// Tasks belonging to groups above the monthly limit.
    pub fn overloaded_tasks(&self) -> Vec<NormalizedTask> {
        self.tasks_of(|r| r.alert_monthly.active)
    }

    /// Tasks belonging to groups flagged idle.
    pub fn idle_tasks(&self) -> Vec<NormalizedTask> {
        self.tasks_of(|r| r.idle.active)
    }

    fn tasks_of(&self, pick: impl Fn(&ClassifiedRollup) -> bool) -> Vec<NormalizedTask> {
        let groups: HashSet<&str> = self
            .rollups
            .iter()
            .filter(|r| pick(r))
            .map(|r| r.rollup.group.as_str())
            .collect();

        self.tasks
            .iter()
            .filter(|t| groups.contains(t.record.group.as_str()))
            .cloned()
            .collect()
    }

    /// Rollups to show after the status filter and the hide-zero option.
    pub fn displayed(&self, status: StatusFilter, hide_zero: bool) -> Vec<ClassifiedRollup> {
        self.rollups
            .iter()
            .filter(|r| match status {
                StatusFilter::All => true,
                StatusFilter::Overloaded => r.alert_monthly.active,
                StatusFilter::Idle => r.idle.active,
            })
            .filter(|r| !hide_zero || !r.rollup.is_zero())
            .cloned()
            .collect()
    }

    /// Whether any group is above its monthly limit.
    pub fn has_overload(&self) -> bool {
        self.rollups.iter().any(|r| r.alert_monthly.active)
    }
}
