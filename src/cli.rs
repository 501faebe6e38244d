//! 命令行参数定义

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use highlight_engine::HeuristicProfile;
use std::path::PathBuf;

use crate::model::{Classification, DetectionMode, InputKind};

#[derive(Debug, Parser)]
#[command(
    name = "ai-detector",
    about = "Detect AI-generated text with a remote classification service",
    version,
    long_about = None
)]
pub struct Cli {
    /// Path to config.yaml (searched in the usual locations when omitted)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze pasted text, a text file on stdin, or a document upload
    Analyze(AnalyzeArgs),

    /// Run the offline sentence heuristics for a given AI probability
    Highlight {
        /// AI probability in [0, 1]
        #[arg(long, short = 'p', value_parser = parse_probability)]
        probability: f64,
        #[arg(long)]
        profile: Option<HeuristicProfile>,
        /// Emit highlighted HTML instead of the sentence listing
        #[arg(long)]
        html: bool,
        /// Text file to read (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Analyze up to 20 documents sequentially
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, short = 'm')]
        mode: Option<DetectionMode>,
        /// Write a CSV of successful results
        #[arg(long)]
        csv: bool,
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,
    },

    /// Inspect and manage the local analysis history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Show or change user preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Show the stored theme, or flip it with --toggle
    Theme {
        #[arg(long)]
        toggle: bool,
    },

    /// Query the detection service health endpoint
    Health,

    /// Show the detection service model configuration
    Info,

    /// Validate or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print build information
    Version,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Text to analyze (reads stdin when neither --text nor --file is given)
    #[arg(long, short = 't', conflicts_with = "file")]
    pub text: Option<String>,
    /// PDF or Word document to upload
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
    #[arg(long, short = 'm')]
    pub mode: Option<DetectionMode>,
    #[arg(long)]
    pub profile: Option<HeuristicProfile>,
    /// Export a PDF report (requires wkhtmltopdf)
    #[arg(long)]
    pub pdf: bool,
    /// Export an HTML report
    #[arg(long)]
    pub html: bool,
    /// Print the raw service response as JSON
    #[arg(long)]
    pub json: bool,
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List saved analyses, newest first
    List {
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Show one analysis by id
    Show { id: String },
    /// Case-insensitive search over file name, text snippet and label
    Search { query: String },
    /// Filter by type, classification, probability and date range
    Filter(FilterArgs),
    /// Delete one analysis by id
    Delete { id: String },
    /// Delete all analyses
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Aggregate statistics
    Stats,
    /// Export the history as pretty JSON
    Export {
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,
    },
    /// Merge a previously exported JSON file
    Import { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long = "type")]
    pub kind: Option<InputKind>,
    #[arg(long)]
    pub classification: Option<Classification>,
    /// Inclusive start, `YYYY-MM-DD` or RFC 3339
    #[arg(long, value_parser = parse_date_from)]
    pub from: Option<DateTime<Utc>>,
    /// Inclusive end, `YYYY-MM-DD` or RFC 3339
    #[arg(long, value_parser = parse_date_to)]
    pub to: Option<DateTime<Utc>>,
    #[arg(long, value_parser = parse_probability)]
    pub min_probability: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    Show,
    /// Set one preference by its camelCase key
    Set { key: String, value: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Validate the configuration and print the report
    Check,
    /// Write a default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let p: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("probability must be between 0 and 1, got {p}"))
    }
}

fn parse_date_bound(value: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got {value}"))?;
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("invalid local time: {value}"))
}

/// 仅给日期时取当天零点（本地时间）
fn parse_date_from(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date_bound(value, NaiveTime::MIN)
}

/// 仅给日期时取当天最后一毫秒（本地时间）
fn parse_date_to(value: &str) -> Result<DateTime<Utc>, String> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    parse_date_bound(value, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "ai-detector", "analyze", "--text", "hello world", "--mode", "hybrid", "--pdf",
        ]);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.text.as_deref(), Some("hello world"));
                assert_eq!(args.mode, Some(DetectionMode::Hybrid));
                assert!(args.pdf);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let parsed = Cli::try_parse_from([
            "ai-detector", "analyze", "--text", "x", "--file", "a.pdf",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_history_filter() {
        let cli = Cli::parse_from([
            "ai-detector",
            "history",
            "filter",
            "--type",
            "file",
            "--classification",
            "ai",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31T12:00:00Z",
            "--min-probability",
            "0.7",
        ]);
        let Commands::History {
            command: HistoryCommand::Filter(args),
        } = cli.command
        else {
            panic!("expected history filter");
        };
        assert_eq!(args.kind, Some(InputKind::File));
        assert_eq!(args.classification, Some(Classification::Ai));
        assert_eq!(args.min_probability, Some(0.7));
        assert_eq!(args.to.unwrap().to_rfc3339(), "2024-01-31T12:00:00+00:00");
        assert!(args.from.unwrap() < args.to.unwrap());
    }

    #[test]
    fn test_probability_bounds() {
        assert_eq!(parse_probability("0.45"), Ok(0.45));
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("abc").is_err());
    }

    #[test]
    fn test_date_only_bounds_cover_whole_day() {
        let from = parse_date_from("2024-06-15").unwrap();
        let to = parse_date_to("2024-06-15").unwrap();
        assert_eq!((to - from).num_milliseconds(), 86_399_999);
    }
}
