//! Rollup of normalized tasks per grouping key.

use crate::models::{GroupRollup, NormalizedTask, TaskRecord};
use std::collections::{HashMap, HashSet};

/// Distinct grouping keys in first-seen order.
pub fn distinct_groups(records: &[TaskRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.group.as_str()))
        .map(|r| r.group.clone())
        .collect()
}

/// Sum monthly hours and task counts per group, then reindex against
/// `groups` so that every key in it gets a rollup, zero-filled when no
/// task survived filtering.
///
/// `groups` must be the key set of the input before frequency filtering;
/// the output has exactly one rollup per entry, in the same order.
pub fn rollup(tasks: &[NormalizedTask], groups: &[String]) -> Vec<GroupRollup> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for task in tasks {
        let entry = sums.entry(task.record.group.as_str()).or_default();
        entry.0 += task.monthly_hours();
        entry.1 += 1;
    }

    // Reindex: naive grouping drops empty groups.
    groups
        .iter()
        .map(|group| match sums.get(group.as_str()) {
            Some(&(monthly, count)) => derive(group, monthly, count),
            None => GroupRollup::empty(group.as_str()),
        })
        .collect()
}

fn derive(group: &str, monthly_hours: f64, task_count: usize) -> GroupRollup {
    let weekly_hours = monthly_hours / 4.0;
    GroupRollup {
        group: group.to_string(),
        weekly_hours,
        monthly_hours,
        annual_hours: monthly_hours * 12.0,
        task_count,
        daily_avg: weekly_hours / 5.0,
    }
}
