use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use sessionlens_core::{EntryKind, ReportStore, ReportSummary, SessionReport, TimelineEntry};

#[derive(Subcommand, Debug)]
pub enum ReportsAction {
    /// List saved reports
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a saved report
    Show {
        /// Report ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_reports_command(action: ReportsAction) -> Result<()> {
    let store = ReportStore::new()?;

    match action {
        ReportsAction::List { json } => {
            let summaries = store.list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("{}", "No reports found.".dimmed());
            } else {
                print_reports_table(&summaries);
            }
        }
        ReportsAction::Show { id, json } => {
            let report = store.get(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn print_reports_table(summaries: &[ReportSummary]) {
    println!(
        "{:<36} {:<17} {:<8} {:<8} {:<8} {}",
        "ID".dimmed(),
        "STARTED".dimmed(),
        "RESULT".dimmed(),
        "DURATION".dimmed(),
        "ENTRIES".dimmed(),
        "TASK".dimmed(),
    );

    for s in summaries {
        let started = s
            .start_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let task = s.task_name.as_deref().unwrap_or(&s.task_id);

        println!(
            "{:<36} {:<17} {:<8} {:<8} {:<8} {}",
            s.id,
            started,
            verdict_label(s.success),
            format_duration(s.total_duration_ms),
            s.entries,
            truncate(task, 50)
        );
    }
}

pub fn print_report(report: &SessionReport) {
    println!("{}", "=== Session Report ===".bright_blue().bold());
    println!("{}  {}", "Session:".dimmed(), report.session_id);
    println!("{}  {}", "Task:".dimmed(), report.task_id);
    if let Some(ref name) = report.task_name {
        println!("{}  {}", "Task Name:".dimmed(), name);
    }
    if let Some(start) = report.start_time {
        println!(
            "{}  {}",
            "Started:".dimmed(),
            start.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!(
        "{}  {}",
        "Duration:".dimmed(),
        format_duration(report.total_duration_ms)
    );
    if let Some(code) = report.metadata.exit_code {
        println!("{}  {}", "Exit Code:".dimmed(), code);
    }
    println!("{}  {}", "Tokens:".dimmed(), report.metadata.total_tokens);
    if !report.metadata.tools_used.is_empty() {
        println!(
            "{}  {}",
            "Tools:".dimmed(),
            report.metadata.tools_used.join(", ")
        );
    }
    println!();
    println!("{}", "Prompt:".dimmed());
    println!("  {}", report.user_prompt);
    println!();

    println!("{}  {}", "Result:".dimmed(), verdict_label(report.success));
    if let Some(ref reason) = report.success_reason {
        println!("{}  {}", "Reason:".dimmed(), reason);
    }

    if !report.timeline.is_empty() {
        println!();
        println!(
            "{}",
            format!("--- Timeline ({}) ---", report.timeline.len()).dimmed()
        );
        for entry in &report.timeline {
            print_entry(entry);
        }
    }
}

fn print_entry(entry: &TimelineEntry) {
    let time = entry
        .timestamp
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    match entry.kind {
        EntryKind::Status => {
            println!(
                "  {} {}",
                time.dimmed(),
                entry.message.as_deref().unwrap_or_default()
            );
        }
        EntryKind::Tool => {
            let name = entry.name.as_deref().unwrap_or("tool");
            let mut line = format!("  {} {}", time.dimmed(), name.bright_cyan());
            if let Some(ref description) = entry.description {
                line.push_str(&format!(" {}", truncate(description, 60)));
            }
            if let Some(ref stats) = entry.stats {
                line.push_str(&format!(" {}", format!("({})", stats).dimmed()));
            }
            if let Some(ref summary) = entry.summary {
                line.push_str(&format!(" {}", summary.dimmed()));
            }
            println!("{}", line);
        }
        EntryKind::Summary => {
            println!(
                "  {} {} {}",
                time.dimmed(),
                entry.message.as_deref().unwrap_or("Summary").bright_magenta(),
                entry.summary.as_deref().unwrap_or_default().dimmed()
            );
            if let Some(ref preview) = entry.preview {
                for line in preview.lines() {
                    println!("    {} {}", "│".dimmed(), line);
                }
            }
        }
        EntryKind::Error => {
            println!(
                "  {} {} {}",
                time.dimmed(),
                "✗".bright_red(),
                entry.message.as_deref().unwrap_or_default().bright_red()
            );
        }
    }
}

fn verdict_label(success: Option<bool>) -> String {
    match success {
        Some(true) => "success".bright_green().to_string(),
        Some(false) => "failed".bright_red().to_string(),
        None => "unknown".bright_yellow().to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

pub fn format_duration(ms: i64) -> String {
    let secs = ms as f64 / 1000.0;
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining_secs = (secs % 60.0) as u64;
        format!("{}m {}s", mins, remaining_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0.0s");
        assert_eq!(format_duration(6_000), "6.0s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("⏺ done", 3), "⏺ d...");
        assert_eq!(truncate("short", 10), "short");
    }
}
