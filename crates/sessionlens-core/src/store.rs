use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::SessionReport;

/// Summary of a saved report for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    pub session_id: String,
    pub task_id: String,
    pub task_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub total_duration_ms: i64,
    pub success: Option<bool>,
    pub success_reason: Option<String>,
    pub entries: usize,
    pub total_tokens: u64,
}

impl ReportSummary {
    fn from_report(id: String, report: &SessionReport) -> Self {
        Self {
            id,
            session_id: report.session_id.clone(),
            task_id: report.task_id.clone(),
            task_name: report.task_name.clone(),
            start_time: report.start_time,
            total_duration_ms: report.total_duration_ms,
            success: report.success,
            success_reason: report.success_reason.clone(),
            entries: report.timeline.len(),
            total_tokens: report.metadata.total_tokens,
        }
    }
}

/// Saved session reports, one pretty-printed JSON file each.
pub struct ReportStore {
    reports_dir: PathBuf,
}

impl ReportStore {
    /// Create a ReportStore using the default reports directory.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().with_context(|| "Could not determine data directory")?;
        let reports_dir = data_dir.join("sessionlens").join("reports");
        Ok(Self { reports_dir })
    }

    /// Create a ReportStore with a custom directory (useful for testing).
    pub fn with_dir(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }

    pub fn reports_dir(&self) -> &PathBuf {
        &self.reports_dir
    }

    /// Persist a report and return its id. The id is derived from the
    /// session's start time and identity, so saving the same session again
    /// overwrites the earlier file.
    pub fn save(&self, report: &SessionReport) -> Result<String> {
        fs::create_dir_all(&self.reports_dir)
            .with_context(|| format!("Failed to create reports dir: {:?}", self.reports_dir))?;

        let id = report_id(report);
        let path = self.reports_dir.join(format!("{}.json", id));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).with_context(|| format!("Failed to write report: {:?}", path))?;

        tracing::debug!(id = %id, path = %path.display(), "Saved report");
        Ok(id)
    }

    /// Load a saved report by id.
    pub fn get(&self, id: &str) -> Result<SessionReport> {
        let path = self.reports_dir.join(format!("{}.json", id));
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to open report file: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse report: {:?}", path))
    }

    /// List saved reports, newest session first.
    pub fn list(&self) -> Result<Vec<ReportSummary>> {
        if !self.reports_dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        let entries = fs::read_dir(&self.reports_dir)
            .with_context(|| format!("Failed to read reports dir: {:?}", self.reports_dir))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.get(id) {
                Ok(report) => summaries.push(ReportSummary::from_report(id.to_string(), &report)),
                Err(e) => tracing::warn!("Failed to parse report {:?}: {}", path, e),
            }
        }

        summaries.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

fn report_id(report: &SessionReport) -> String {
    let timestamp = report.start_time.unwrap_or_else(Utc::now);
    let timestamp_str = timestamp.format("%Y-%m-%dT%H-%M-%SZ").to_string();

    let mut hasher = Sha256::new();
    hasher.update(report.session_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(report.task_id.as_bytes());
    let hash = hex::encode(hasher.finalize());

    format!("{}_{}", timestamp_str, &hash[..6])
}
