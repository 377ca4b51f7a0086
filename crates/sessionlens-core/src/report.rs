use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use sessionlens_filters::{filter_capture, AnimationFrameDetector, TextSimilarityFilter};
use sessionlens_ingest::{
    find_transcript_path, parse_capture_file, parse_log_file, parse_transcript_file, HookLogEntry,
};

use crate::classifier::SuccessClassifier;
use crate::config::PipelineConfig;
use crate::error::ReportError;
use crate::timeline::{
    build_timeline, extract_user_prompt, narrative_entry, sort_timeline, tools_used, total_tokens,
};
use crate::types::{ReportMetadata, SessionReport, MISSING_PROMPT, UNKNOWN_SESSION_ID};

/// What to reconstruct.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Hook lifecycle log of the session
    pub hook_log: PathBuf,
    /// Caller's identifier for the task the session worked on
    pub task_id: String,
    pub task_name: Option<String>,
    /// Exit code of the assistant process, when the caller saw it exit
    pub exit_code: Option<i32>,
    /// Terminal capture log to condense into a summary entry
    pub capture_log: Option<PathBuf>,
}

impl ReportRequest {
    pub fn new(hook_log: impl Into<PathBuf>, task_id: impl Into<String>) -> Self {
        Self {
            hook_log: hook_log.into(),
            task_id: task_id.into(),
            task_name: None,
            exit_code: None,
            capture_log: None,
        }
    }

    pub fn with_task_name(mut self, name: impl Into<String>) -> Self {
        self.task_name = Some(name.into());
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn with_capture_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture_log = Some(path.into());
        self
    }
}

/// Turns a session's logs into a [`SessionReport`].
pub struct ReportAssembler {
    config: PipelineConfig,
    classifier: SuccessClassifier,
}

impl ReportAssembler {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            classifier: SuccessClassifier::new(config.classifier.clone()),
            config,
        }
    }

    /// Build the report. Never fails: an unreadable log or a hook log without
    /// a transcript reference yields an error report instead.
    pub fn assemble(&self, request: &ReportRequest) -> SessionReport {
        match self.try_assemble(request) {
            Ok(report) => report,
            Err(e) => {
                warn!(hook_log = %request.hook_log.display(), error = %e, "Session reconstruction failed");
                SessionReport::error(request.task_id.clone(), request.task_name.clone(), &e.to_string())
            }
        }
    }

    pub fn try_assemble(&self, request: &ReportRequest) -> Result<SessionReport, ReportError> {
        let hooks = parse_log_file(&request.hook_log)?;

        let transcript_ref =
            find_transcript_path(&hooks).ok_or_else(|| ReportError::TranscriptNotFound {
                hook_log: request.hook_log.clone(),
            })?;
        let transcript_path = resolve_transcript_path(&request.hook_log, &transcript_ref);
        debug!(transcript = %transcript_path.display(), "Resolved transcript");
        let transcript = parse_transcript_file(&transcript_path)?;

        let user_prompt =
            extract_user_prompt(&transcript).unwrap_or_else(|| MISSING_PROMPT.to_string());

        let start_time = hooks.first().map(|e| e.timestamp);
        let end_time = hooks.last().map(|e| e.timestamp);
        let total_duration_ms = match (start_time, end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => 0,
        };

        let mut timeline = build_timeline(&hooks, &transcript);
        let verdict = self.classifier.classify(&timeline, &transcript);

        // The summary entry is added after classification so it never
        // influences the verdict.
        if let Some(capture_log) = &request.capture_log {
            if let Some(text) = self.terminal_narrative(capture_log, end_time) {
                timeline.push(narrative_entry(&text, end_time));
                timeline = sort_timeline(timeline);
            }
        }

        let report = SessionReport {
            session_id: session_id(&hooks),
            task_id: request.task_id.clone(),
            task_name: request.task_name.clone(),
            user_prompt,
            start_time,
            end_time,
            total_duration_ms,
            success: Some(verdict.success),
            success_reason: Some(verdict.reason),
            timeline,
            metadata: ReportMetadata {
                exit_code: request.exit_code,
                tools_used: tools_used(&hooks),
                total_tokens: total_tokens(&transcript),
            },
        };

        info!(
            session_id = %report.session_id,
            entries = report.timeline.len(),
            success = verdict.success,
            "Assembled session report"
        );

        Ok(report)
    }

    /// Filtered terminal output, or `None` if the capture log is unreadable or
    /// nothing survives filtering.
    fn terminal_narrative(
        &self,
        capture_log: &Path,
        fallback_time: Option<DateTime<Utc>>,
    ) -> Option<String> {
        let records = match parse_capture_file(capture_log) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Skipping terminal capture");
                return None;
            }
        };

        let mut detector = AnimationFrameDetector::new(self.config.animation.clone());
        let mut similarity = TextSimilarityFilter::new(self.config.similarity.clone());
        let text = filter_capture(
            &records,
            &mut detector,
            &mut similarity,
            fallback_time.unwrap_or_else(Utc::now),
        );

        (!text.trim().is_empty()).then_some(text)
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

fn session_id(hooks: &[HookLogEntry]) -> String {
    hooks
        .iter()
        .map(|e| e.session_id.as_str())
        .find(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_SESSION_ID)
        .to_string()
}

/// Expand `~/` and resolve relative references against the hook log's
/// directory.
fn resolve_transcript_path(hook_log: &Path, reference: &str) -> PathBuf {
    if let Some(rest) = reference.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path = PathBuf::from(reference);
    if path.is_relative() {
        if let Some(dir) = hook_log.parent() {
            return dir.join(path);
        }
    }
    path
}
