//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::ingest::RowSelection;
use crate::models::{GroupBy, IdleCriterion, StatusFilter};

/// Workload - recurring workload per role, with overload and idle alerts
///
/// Reads a task table (CSV or JSON), converts every task into monthly
/// hours from its duration and frequency, rolls the hours up per role
/// or category and flags groups above or well below the limits.
///
/// Examples:
///   workload tarefas.csv
///   workload tarefas.csv --limit-monthly 160 --status overloaded
///   workload tarefas.csv --idle-criterion weekly --idle-fraction 0.5
///   workload tarefas.csv --format json --output report.json --export-dir out/
///   workload --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Task table to analyze (.csv or .json)
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Group tasks by role or by category
    #[arg(short, long, value_name = "KEY")]
    pub group_by: Option<GroupBy>,

    /// Daily limit per group, in hours
    #[arg(long, value_name = "HOURS", env = "WORKLOAD_LIMIT_DAILY")]
    pub limit_daily: Option<f64>,

    /// Weekly limit per group, in hours
    #[arg(long, value_name = "HOURS", env = "WORKLOAD_LIMIT_WEEKLY")]
    pub limit_weekly: Option<f64>,

    /// Monthly limit per group, in hours
    #[arg(long, value_name = "HOURS", env = "WORKLOAD_LIMIT_MONTHLY")]
    pub limit_monthly: Option<f64>,

    /// Annual limit per group, in hours
    #[arg(long, value_name = "HOURS", env = "WORKLOAD_LIMIT_ANNUAL")]
    pub limit_annual: Option<f64>,

    /// Horizon used to classify idle groups
    #[arg(long, value_name = "HORIZON", env = "WORKLOAD_IDLE_CRITERION")]
    pub idle_criterion: Option<IdleCriterion>,

    /// Fraction of the limit below which a group is idle (0 < F <= 1)
    #[arg(long, value_name = "F", env = "WORKLOAD_IDLE_FRACTION")]
    pub idle_fraction: Option<f64>,

    /// Which groups to show in the rollup table
    #[arg(long, value_name = "STATUS")]
    pub status: Option<StatusFilter>,

    /// Hide groups with zero hours and zero tasks
    #[arg(long)]
    pub hide_zero: bool,

    /// Only analyze rows of this stage
    #[arg(long, value_name = "STAGE")]
    pub stage: Option<String>,

    /// Only analyze rows of this activity
    #[arg(long, value_name = "ACTIVITY")]
    pub activity: Option<String>,

    /// Only analyze rows of this group
    #[arg(long = "group", value_name = "GROUP")]
    pub group_filter: Option<String>,

    /// Output file path for the report
    ///
    /// Defaults to the config value, or workload_report.<ext> for the
    /// chosen format
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Directory for drill-down CSV exports
    ///
    /// Writes rollups.csv, excluded_tasks.csv, overloaded_tasks.csv
    /// and idle_tasks.csv.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Exit with code 2 if any group is above its monthly limit
    #[arg(long)]
    pub fail_on_overload: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .workload.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .workload.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV rollup table
    Csv,
}

impl OutputFormat {
    /// File extension of a report in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let limits = [
            ("--limit-daily", self.limit_daily),
            ("--limit-weekly", self.limit_weekly),
            ("--limit-monthly", self.limit_monthly),
            ("--limit-annual", self.limit_annual),
        ];
        for (flag, value) in limits {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(format!("{} must be a positive number of hours", flag));
                }
            }
        }

        if let Some(f) = self.idle_fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err("--idle-fraction must be in (0, 1]".to_string());
            }
        }

        // Validate input file
        match self.input {
            None => return Err("An input file is required".to_string()),
            Some(ref path) if !path.is_file() => {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Row filters given on the command line.
    pub fn row_selection(&self) -> RowSelection {
        RowSelection {
            stage: self.stage.clone(),
            activity: self.activity.clone(),
            group: self.group_filter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn make_args(input: PathBuf) -> Args {
        Args {
            input: Some(input),
            group_by: None,
            limit_daily: None,
            limit_weekly: None,
            limit_monthly: None,
            limit_annual: None,
            idle_criterion: None,
            idle_fraction: None,
            status: None,
            hide_zero: false,
            stage: None,
            activity: None,
            group_filter: None,
            output: None,
            format: OutputFormat::Markdown,
            export_dir: None,
            fail_on_overload: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        let file = NamedTempFile::new().unwrap();
        assert!(make_args(file.path().to_path_buf()).validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let args = make_args(PathBuf::from("/definitely/not/here.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_limits_and_fraction() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());

        args.limit_monthly = Some(0.0);
        assert!(args.validate().is_err());

        args.limit_monthly = Some(160.0);
        args.idle_fraction = Some(0.0);
        assert!(args.validate().is_err());

        args.idle_fraction = Some(1.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args(PathBuf::from("missing.csv"));
        args.input = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(PathBuf::from("x.csv"));
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "workload",
            "tasks.csv",
            "--group-by",
            "category",
            "--limit-monthly",
            "150",
            "--idle-criterion",
            "weekly",
            "--status",
            "idle",
            "--group",
            "Analista",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("tasks.csv")));
        assert_eq!(args.group_by, Some(GroupBy::Category));
        assert_eq!(args.limit_monthly, Some(150.0));
        assert_eq!(args.idle_criterion, Some(IdleCriterion::Weekly));
        assert_eq!(args.status, Some(StatusFilter::Idle));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.row_selection().group.as_deref(), Some("Analista"));
    }

    #[test]
    fn test_threshold_flags_read_env() {
        use clap::CommandFactory;

        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .and_then(|e| e.to_str())
                .map(String::from)
        };

        assert_eq!(env_of("limit_daily").as_deref(), Some("WORKLOAD_LIMIT_DAILY"));
        assert_eq!(env_of("limit_weekly").as_deref(), Some("WORKLOAD_LIMIT_WEEKLY"));
        assert_eq!(env_of("limit_monthly").as_deref(), Some("WORKLOAD_LIMIT_MONTHLY"));
        assert_eq!(env_of("limit_annual").as_deref(), Some("WORKLOAD_LIMIT_ANNUAL"));
        assert_eq!(env_of("idle_criterion").as_deref(), Some("WORKLOAD_IDLE_CRITERION"));
        assert_eq!(env_of("idle_fraction").as_deref(), Some("WORKLOAD_IDLE_FRACTION"));
    }
}
