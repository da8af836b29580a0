//! Task table ingestion.
//!
//! Reads the task table from CSV or JSON into [`TaskRecord`]s. The
//! required columns are checked once against the header before any row
//! is parsed; individual cells are never rejected.

use crate::error::{Result, WorkloadError};
use crate::models::{GroupBy, RawDuration, TaskRecord};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Header names of the logical columns.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    /// Column holding the grouping key (role or category).
    pub group: String,
    pub stage: String,
    pub activity: String,
    pub duration: String,
    pub frequency: String,
    /// Group assigned to rows with an empty grouping key.
    pub missing_group: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            group: "FUNÇÃO".to_string(),
            stage: "ETAPA".to_string(),
            activity: "ATIVIDADE".to_string(),
            duration: "C.H ATUAL".to_string(),
            frequency: "FREQUÊNCIA".to_string(),
            missing_group: "not informed".to_string(),
        }
    }
}

impl From<&crate::config::Config> for ColumnMap {
    fn from(config: &crate::config::Config) -> Self {
        let columns = &config.columns;
        let group = match config.report.group_by {
            GroupBy::Role => columns.role.clone(),
            GroupBy::Category => columns.category.clone(),
        };

        Self {
            group,
            stage: columns.stage.clone(),
            activity: columns.activity.clone(),
            duration: columns.duration.clone(),
            frequency: columns.frequency.clone(),
            missing_group: columns.missing_group.clone(),
        }
    }
}

/// Positions of the logical columns in a CSV header.
struct HeaderIndex {
    group: usize,
    stage: usize,
    activity: usize,
    duration: usize,
    frequency: usize,
}

impl HeaderIndex {
    fn resolve(headers: &[String], columns: &ColumnMap) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| WorkloadError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            group: find(&columns.group)?,
            stage: find(&columns.stage)?,
            activity: find(&columns.activity)?,
            duration: find(&columns.duration)?,
            frequency: find(&columns.frequency)?,
        })
    }
}

/// Loads task tables according to a column mapping.
pub struct TableReader {
    columns: ColumnMap,
}

impl TableReader {
    /// Create a reader for the given column mapping.
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Load a table, picking the format from the file extension.
    pub fn load(&self, path: &Path) -> Result<Vec<TaskRecord>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if ext != "csv" && ext != "json" {
            return Err(WorkloadError::UnsupportedFormat(path.to_path_buf()));
        }

        let file = BufReader::new(File::open(path)?);
        let records = if ext == "csv" {
            self.read_csv(file)?
        } else {
            self.read_json(file)?
        };

        debug!("Read {} row(s) from {}", records.len(), path.display());
        Ok(records)
    }

    /// Read a CSV table with a header row.
    pub fn read_csv<R: Read>(&self, reader: R) -> Result<Vec<TaskRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(WorkloadError::EmptyInput);
        }
        let idx = HeaderIndex::resolve(&headers, &self.columns)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            records.push(self.build(
                i + 1,
                row.get(idx.group),
                row.get(idx.stage),
                row.get(idx.activity),
                row.get(idx.duration),
                row.get(idx.frequency),
            ));
        }

        Ok(records)
    }

    /// Read a JSON array of row objects. A column counts as present if
    /// any row carries the key; rows may omit keys whose value is empty.
    pub fn read_json<R: Read>(&self, reader: R) -> Result<Vec<TaskRecord>> {
        let rows: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
        if rows.is_empty() {
            return Err(WorkloadError::EmptyInput);
        }

        let keys: HashSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        for column in [
            &self.columns.group,
            &self.columns.stage,
            &self.columns.activity,
            &self.columns.duration,
            &self.columns.frequency,
        ] {
            if !keys.contains(column.as_str()) {
                return Err(WorkloadError::MissingColumn {
                    column: column.clone(),
                });
            }
        }

        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = |name: &str| row.get(name).and_then(json_cell);
                self.build(
                    i + 1,
                    cell(&self.columns.group).as_deref(),
                    cell(&self.columns.stage).as_deref(),
                    cell(&self.columns.activity).as_deref(),
                    cell(&self.columns.duration).as_deref(),
                    cell(&self.columns.frequency).as_deref(),
                )
            })
            .collect();

        Ok(records)
    }

    fn build(
        &self,
        row: usize,
        group: Option<&str>,
        stage: Option<&str>,
        activity: Option<&str>,
        duration: Option<&str>,
        frequency: Option<&str>,
    ) -> TaskRecord {
        TaskRecord {
            row,
            group: present(group)
                .map(|g| g.trim().to_string())
                .unwrap_or_else(|| self.columns.missing_group.clone()),
            stage: present(stage).map(String::from),
            activity: present(activity).map(String::from),
            duration: RawDuration::from_cell(duration),
            frequency: present(frequency).map(String::from),
        }
    }
}

/// Blank cells count as missing.
fn present(cell: Option<&str>) -> Option<&str> {
    cell.filter(|s| !s.trim().is_empty())
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Exact-match row selection applied before aggregation.
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    pub stage: Option<String>,
    pub activity: Option<String>,
    pub group: Option<String>,
}

impl RowSelection {
    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.stage.is_none() && self.activity.is_none() && self.group.is_none()
    }

    /// Whether a record passes every filter that is set.
    pub fn matches(&self, record: &TaskRecord) -> bool {
        fn ok(want: &Option<String>, got: Option<&str>) -> bool {
            want.as_deref().map_or(true, |w| got == Some(w))
        }

        ok(&self.stage, record.stage.as_deref())
            && ok(&self.activity, record.activity.as_deref())
            && ok(&self.group, Some(record.group.as_str()))
    }

    /// Keep only matching records.
    pub fn apply(&self, records: Vec<TaskRecord>) -> Vec<TaskRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
