//! Input normalization.
//!
//! Turns raw durations into decimal hours and splits records by whether
//! they carry a frequency label. Both steps are total: dirty cells become
//! zero hours, rows without a frequency are set aside and returned to the
//! caller.

use crate::analysis::frequency::{self, normalize_label};
use crate::models::{NormalizedTask, RawDuration, TaskRecord};
use chrono::Timelike;

/// Convert a raw duration into decimal hours. Missing or unparseable
/// values yield 0.
pub fn duration_hours(raw: &RawDuration) -> f64 {
    match raw {
        RawDuration::Missing => 0.0,
        RawDuration::TimeOfDay(t) => to_hours(t.hour(), t.minute(), t.second()),
        RawDuration::Text(text) => parse_hms(text).unwrap_or(0.0),
    }
}

/// Parse `H:M:S` with integer components. Hours may exceed 23.
fn parse_hms(text: &str) -> Option<f64> {
    let mut parts = text.trim().split(':');
    let h = parts.next()?.trim().parse::<u32>().ok()?;
    let m = parts.next()?.trim().parse::<u32>().ok()?;
    let s = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(to_hours(h, m, s))
}

fn to_hours(h: u32, m: u32, s: u32) -> f64 {
    f64::from(h) + f64::from(m) / 60.0 + f64::from(s) / 3600.0
}

/// Records split by presence of a frequency label.
#[derive(Debug, Default)]
pub struct Partition {
    pub with_frequency: Vec<TaskRecord>,
    pub without_frequency: Vec<TaskRecord>,
}

/// Split records into the "has frequency" and "missing frequency" sets.
/// Every record lands in exactly one of them, in input order.
pub fn partition(records: Vec<TaskRecord>) -> Partition {
    let (with_frequency, without_frequency) =
        records.into_iter().partition(TaskRecord::has_frequency);

    Partition {
        with_frequency,
        without_frequency,
    }
}

/// Derive hours and monthly occurrences for a record.
pub fn normalize(record: TaskRecord) -> NormalizedTask {
    let frequency_label = record
        .frequency
        .as_deref()
        .map(normalize_label)
        .unwrap_or_default();
    let duration_hours = duration_hours(&record.duration);
    let monthly_occurrences = frequency::monthly_occurrences(&frequency_label);

    NormalizedTask {
        record,
        frequency_label,
        duration_hours,
        monthly_occurrences,
    }
}
