//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.workload.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::models::{GroupBy, IdleCriterion, StatusFilter, Thresholds};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".workload.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Hour limits per horizon.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Idleness criterion.
    #[serde(default)]
    pub idle: IdleConfig,

    /// Input column names.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report file path. Unset means `workload_report.<ext>` for the
    /// chosen format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

const DEFAULT_REPORT_STEM: &str = "workload_report";

/// Maximum hours per group on each horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_daily")]
    pub daily: f64,

    #[serde(default = "default_weekly")]
    pub weekly: f64,

    #[serde(default = "default_monthly")]
    pub monthly: f64,

    #[serde(default = "default_annual")]
    pub annual: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            daily: default_daily(),
            weekly: default_weekly(),
            monthly: default_monthly(),
            annual: default_annual(),
        }
    }
}

fn default_daily() -> f64 {
    9.0
}

fn default_weekly() -> f64 {
    44.0
}

fn default_monthly() -> f64 {
    176.0
}

fn default_annual() -> f64 {
    2112.0
}

/// When a group counts as idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Horizon compared against its limit.
    #[serde(default)]
    pub criterion: IdleCriterion,

    /// Fraction of the limit below which a group is idle.
    #[serde(default = "default_idle_fraction")]
    pub fraction: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            criterion: IdleCriterion::default(),
            fraction: default_idle_fraction(),
        }
    }
}

fn default_idle_fraction() -> f64 {
    0.8
}

/// Header names in the input table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_role_column")]
    pub role: String,

    #[serde(default = "default_category_column")]
    pub category: String,

    #[serde(default = "default_stage_column")]
    pub stage: String,

    #[serde(default = "default_activity_column")]
    pub activity: String,

    #[serde(default = "default_duration_column")]
    pub duration: String,

    #[serde(default = "default_frequency_column")]
    pub frequency: String,

    /// Group name for rows with an empty grouping key.
    #[serde(default = "default_missing_group")]
    pub missing_group: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            role: default_role_column(),
            category: default_category_column(),
            stage: default_stage_column(),
            activity: default_activity_column(),
            duration: default_duration_column(),
            frequency: default_frequency_column(),
            missing_group: default_missing_group(),
        }
    }
}

fn default_role_column() -> String {
    "FUNÇÃO".to_string()
}

fn default_category_column() -> String {
    "CATEGORIA".to_string()
}

fn default_stage_column() -> String {
    "ETAPA".to_string()
}

fn default_activity_column() -> String {
    "ATIVIDADE".to_string()
}

fn default_duration_column() -> String {
    "C.H ATUAL".to_string()
}

fn default_frequency_column() -> String {
    "FREQUÊNCIA".to_string()
}

fn default_missing_group() -> String {
    "not informed".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Grouping dimension.
    #[serde(default)]
    pub group_by: GroupBy,

    /// Which groups to show in the rollup table.
    #[serde(default)]
    pub status: StatusFilter,

    /// Hide groups with zero hours and zero tasks.
    #[serde(default)]
    pub hide_zero: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(daily) = args.limit_daily {
            self.limits.daily = daily;
        }
        if let Some(weekly) = args.limit_weekly {
            self.limits.weekly = weekly;
        }
        if let Some(monthly) = args.limit_monthly {
            self.limits.monthly = monthly;
        }
        if let Some(annual) = args.limit_annual {
            self.limits.annual = annual;
        }

        if let Some(criterion) = args.idle_criterion {
            self.idle.criterion = criterion;
        }
        if let Some(fraction) = args.idle_fraction {
            self.idle.fraction = fraction;
        }

        if let Some(group_by) = args.group_by {
            self.report.group_by = group_by;
        }
        if let Some(status) = args.status {
            self.report.status = status;
        }

        // Flags always override
        if args.hide_zero {
            self.report.hide_zero = true;
        }
    }

    /// Where to write a report in `format`.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        match self.general.output {
            Some(ref output) => PathBuf::from(output),
            None => PathBuf::from(format!("{}.{}", DEFAULT_REPORT_STEM, format.extension())),
        }
    }

    /// Threshold record for the classifier.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            limit_daily: self.limits.daily,
            limit_weekly: self.limits.weekly,
            limit_monthly: self.limits.monthly,
            limit_annual: self.limits.annual,
            idle_criterion: self.idle.criterion,
            idle_fraction: self.idle.fraction,
        }
    }

    /// Check limits and idle fraction.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.thresholds().validate()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkloadError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.monthly, 176.0);
        assert_eq!(config.idle.criterion, IdleCriterion::Monthly);
        assert_eq!(config.columns.role, "FUNÇÃO");
        assert_eq!(config.thresholds(), Thresholds::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[limits]
monthly = 160
weekly = 40.5

[idle]
criterion = "weekly"
fraction = 0.5

[columns]
role = "Role"
frequency = "Frequency"

[report]
group_by = "category"
status = "overloaded"
hide_zero = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.limits.monthly, 160.0);
        assert_eq!(config.limits.weekly, 40.5);
        assert_eq!(config.limits.daily, 9.0);
        assert_eq!(config.idle.criterion, IdleCriterion::Weekly);
        assert_eq!(config.idle.fraction, 0.5);
        assert_eq!(config.columns.role, "Role");
        assert_eq!(config.columns.stage, "ETAPA");
        assert_eq!(config.report.group_by, GroupBy::Category);
        assert_eq!(config.report.status, StatusFilter::Overloaded);
        assert!(config.report.hide_zero);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[limits]\nannual = 2000\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.limits.annual, 2000.0);
        assert_eq!(config.limits.monthly, 176.0);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[limits\nmonthly = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        use clap::Parser;

        let args = crate::cli::Args::try_parse_from([
            "workload",
            "tasks.csv",
            "--limit-weekly",
            "40",
            "--idle-fraction",
            "0.5",
            "--status",
            "idle",
            "--hide-zero",
            "--output",
            "out.json",
        ])
        .unwrap();

        let mut config = Config::default();
        config.limits.monthly = 150.0;
        config.merge_with_args(&args);

        assert_eq!(config.limits.weekly, 40.0);
        // not given on the command line, file value kept
        assert_eq!(config.limits.monthly, 150.0);
        assert_eq!(config.idle.fraction, 0.5);
        assert_eq!(config.report.status, StatusFilter::Idle);
        assert!(config.report.hide_zero);
        assert_eq!(config.general.output.as_deref(), Some("out.json"));
        assert_eq!(config.output_path(OutputFormat::Csv), PathBuf::from("out.json"));
    }

    #[test]
    fn test_default_output_follows_format() {
        let config = Config::default();
        assert_eq!(
            config.output_path(OutputFormat::Markdown),
            PathBuf::from("workload_report.md")
        );
        assert_eq!(
            config.output_path(OutputFormat::Json),
            PathBuf::from("workload_report.json")
        );
        assert_eq!(
            config.output_path(OutputFormat::Csv),
            PathBuf::from("workload_report.csv")
        );

        let config: Config = toml::from_str("[general]\noutput = \"load.txt\"\n").unwrap();
        assert_eq!(config.output_path(OutputFormat::Json), PathBuf::from("load.txt"));
    }

    #[test]
    fn test_validate_rejects_negative_limit() {
        let mut config = Config::default();
        config.limits.daily = -2.0;
        assert!(matches!(
            config.validate(),
            Err(WorkloadError::InvalidThreshold { name: "limit_daily", .. })
        ));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[limits]"));
        assert!(toml_str.contains("[idle]"));
        assert!(toml_str.contains("[columns]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.thresholds(), Thresholds::default());
    }
}
