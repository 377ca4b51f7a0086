mod config;
mod reports;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use sessionlens_core::{PipelineConfig, ReportAssembler, ReportRequest, ReportStore};
use sessionlens_filters::{filter_capture, AnimationFrameDetector, RawChunk, TextSimilarityFilter};
use sessionlens_ingest::parse_capture_file;
use sessionlens_logging::LogFormat;

use reports::ReportsAction;

#[derive(Parser, Debug)]
#[command(
    name = "sessionlens",
    about = "Reconstruct coding-assistant sessions from hook logs and terminal captures",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also write JSON logs to a daily-rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Path to config file (default: ./sessionlens.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconstruct a session report from a hook log
    Report {
        /// Hook log (JSONL) written by the session hooks
        hook_log: PathBuf,

        /// Task identifier recorded in the report (default: hook log file name)
        #[arg(long)]
        task_id: Option<String>,

        /// Human-readable task name
        #[arg(long)]
        task_name: Option<String>,

        /// Exit code of the assistant process
        #[arg(long)]
        exit_code: Option<i32>,

        /// Terminal capture log to summarise into the timeline
        #[arg(long)]
        capture: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Save the report to the report store
        #[arg(long)]
        save: bool,
    },

    /// Print the meaningful text of a terminal capture log
    Filter {
        /// Terminal capture log (JSONL)
        capture_log: PathBuf,

        /// Skip near-duplicate suppression, keeping every non-animation line
        #[arg(long)]
        unfiltered: bool,
    },

    /// Browse saved reports
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    let log_guard = match cli.log_dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;
            Some(sessionlens_logging::init_tracing_with_file(
                &cli.log_level,
                log_format,
                dir,
            ))
        }
        None => {
            sessionlens_logging::init_tracing(&cli.log_level, log_format);
            None
        }
    };

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let pipeline = config::resolve(cli.config.as_deref(), &working_dir)?;
    tracing::debug!(?pipeline, "Loaded pipeline config");

    match cli.command {
        Commands::Report {
            hook_log,
            task_id,
            task_name,
            exit_code,
            capture,
            json,
            save,
        } => {
            let task_id = task_id.unwrap_or_else(|| default_task_id(&hook_log));
            let mut request = ReportRequest::new(&hook_log, task_id);
            request.task_name = task_name;
            request.exit_code = exit_code;
            request.capture_log = capture;

            let report = ReportAssembler::new(pipeline).assemble(&request);

            if save {
                let store = ReportStore::new()?;
                let id = store.save(&report)?;
                eprintln!("{} {}", "Saved report".dimmed(), id);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                reports::print_report(&report);
            }

            if report.success != Some(true) {
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Commands::Filter {
            capture_log,
            unfiltered,
        } => {
            let text = filter_capture_log(&capture_log, &pipeline, unfiltered)?;
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Commands::Reports { action } => reports::handle_reports_command(action)?,
    }

    Ok(())
}

fn default_task_id(hook_log: &Path) -> String {
    hook_log
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session")
        .to_string()
}

fn filter_capture_log(path: &Path, pipeline: &PipelineConfig, unfiltered: bool) -> Result<String> {
    let records = parse_capture_file(path)?;
    let mut detector = AnimationFrameDetector::new(pipeline.animation.clone());
    let now = Utc::now();

    if unfiltered {
        for record in &records {
            let received_at = record.timestamp.unwrap_or(now);
            detector.process(&RawChunk::new(record.chunk_text(), received_at));
        }
        return Ok(detector.flush());
    }

    let mut similarity = TextSimilarityFilter::new(pipeline.similarity.clone());
    Ok(filter_capture(&records, &mut detector, &mut similarity, now))
}
