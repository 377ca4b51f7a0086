use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Narration from the assistant
    Status,
    /// A completed tool execution
    Tool,
    /// Condensed terminal output
    Summary,
    /// A reconstruction failure
    Error,
}

/// One renderable event in a reconstructed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expandable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ToolDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl TimelineEntry {
    /// An entry of `kind` with every optional field empty.
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            timestamp: None,
            message: None,
            name: None,
            description: None,
            file_path: None,
            stats: None,
            summary: None,
            preview: None,
            full_content: None,
            expandable: None,
            details: None,
            duration_ms: None,
        }
    }

    pub fn status(message: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            message: Some(message.into()),
            timestamp,
            ..Self::new(EntryKind::Status)
        }
    }

    pub fn error(message: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            message: Some(message.into()),
            timestamp,
            ..Self::new(EntryKind::Error)
        }
    }

    pub fn is_tool(&self) -> bool {
        self.kind == EntryKind::Tool
    }

    /// True for tool entries of the given tool name.
    pub fn is_tool_named(&self, name: &str) -> bool {
        self.is_tool() && self.name.as_deref() == Some(name)
    }

    /// The todo list carried by a `TodoWrite` entry.
    pub fn todos(&self) -> Option<&[TodoItem]> {
        match &self.details {
            Some(ToolDetails::Todos(todos)) => Some(todos),
            _ => None,
        }
    }
}

/// Structured extras attached to a tool entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolDetails {
    Todos(Vec<TodoItem>),
    Task(TaskDetails),
    Opaque(Value),
}

/// Sub-agent statistics reported by the `Task` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDetails {
    pub tools_used: Option<u64>,
    pub tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

/// Aggregate numbers for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub tools_used: Vec<String>,
    pub total_tokens: u64,
}

/// The reconstructed record of one assistant session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    pub user_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub total_duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_reason: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub metadata: ReportMetadata,
}

pub const UNKNOWN_SESSION_ID: &str = "unknown";
pub const MISSING_PROMPT: &str = "No user prompt found";
pub const FAILED_PROMPT: &str = "Session could not be reconstructed";

impl SessionReport {
    /// Minimal report for a session that could not be reconstructed.
    pub fn error(task_id: impl Into<String>, task_name: Option<String>, message: &str) -> Self {
        Self {
            session_id: UNKNOWN_SESSION_ID.to_string(),
            task_id: task_id.into(),
            task_name,
            user_prompt: FAILED_PROMPT.to_string(),
            start_time: None,
            end_time: None,
            total_duration_ms: 0,
            success: Some(false),
            success_reason: Some(message.to_string()),
            timeline: vec![TimelineEntry::error(message, Some(Utc::now()))],
            metadata: ReportMetadata::default(),
        }
    }

    pub fn is_error_report(&self) -> bool {
        self.session_id == UNKNOWN_SESSION_ID
            && self.timeline.len() == 1
            && self.timeline[0].kind == EntryKind::Error
    }
}
