use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tracing::debug;

use sessionlens_ingest::{HookLogEntry, TranscriptEntry};

use crate::payload::ToolPayload;
use crate::types::{EntryKind, TaskDetails, TimelineEntry, ToolDetails};

/// Prefix for assistant narration entries.
pub const STATUS_BULLET: &str = "⏺ ";

/// Lines shown before a file body has to be expanded.
const PREVIEW_LINES: usize = 10;

/// Markers of harness-injected user turns that are not the user's request.
const META_MARKERS: &[&str] = &[
    "<command-name>",
    "<command-message>",
    "<local-command-stdout>",
    "<system-reminder>",
    "Caveat: The messages below were generated by the user while running local commands",
];

/// A `PreToolUse` / `PostToolUse` pair.
#[derive(Debug, Clone, Copy)]
pub struct ToolExecution<'a> {
    pub start: &'a HookLogEntry,
    pub end: &'a HookLogEntry,
}

impl<'a> ToolExecution<'a> {
    pub fn name(&self) -> &'a str {
        self.end.tool_name().unwrap_or_default()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end.timestamp - self.start.timestamp).num_milliseconds()
    }
}

/// Pair tool start and end events.
///
/// Each `PostToolUse` closes the oldest open `PreToolUse` with the same tool
/// name. Starts that never close and ends with no open start are dropped.
/// Pairs come out in the order they closed.
pub fn pair_tool_executions(hooks: &[HookLogEntry]) -> Vec<ToolExecution<'_>> {
    let mut pending: HashMap<&str, VecDeque<&HookLogEntry>> = HashMap::new();
    let mut executions = Vec::new();

    for entry in hooks {
        let Some(name) = entry.tool_name() else {
            continue;
        };

        if entry.is_pre_tool_use() {
            pending.entry(name).or_default().push_back(entry);
        } else if entry.is_post_tool_use() {
            match pending.get_mut(name).and_then(VecDeque::pop_front) {
                Some(start) => executions.push(ToolExecution { start, end: entry }),
                None => debug!(tool = name, "PostToolUse without a matching start"),
            }
        }
    }

    let unmatched: usize = pending.values().map(VecDeque::len).sum();
    if unmatched > 0 {
        debug!(unmatched, "Dropping tool starts that never finished");
    }

    executions
}

/// Build the timeline entry for one tool execution.
pub fn create_tool_entry(execution: &ToolExecution<'_>) -> TimelineEntry {
    let name = execution.name();
    let duration_ms = execution.duration_ms();

    let mut entry = TimelineEntry {
        name: Some(name.to_string()),
        timestamp: Some(execution.start.timestamp),
        duration_ms: Some(duration_ms),
        stats: Some(format!("{:.1}s", duration_ms as f64 / 1000.0)),
        ..TimelineEntry::new(EntryKind::Tool)
    };

    let payload = ToolPayload::from_hook(
        name,
        execution.end.data.tool_input.as_ref(),
        execution.end.data.tool_response.as_ref(),
    );

    match payload {
        ToolPayload::FileEdit(response) => {
            if let Some(path) = response.file_path {
                entry.description = Some(path.clone());
                entry.file_path = Some(path);
            }
            if let Some(content) = response.content {
                entry.summary = Some(format!("{} lines", content.lines().count()));
                entry.preview = Some(preview(&content));
                entry.full_content = Some(content);
                entry.expandable = Some(true);
            }
        }
        ToolPayload::WebSearch {
            query,
            result_count,
        } => {
            entry.description = query;
            entry.summary = result_count.map(|n| format!("{} results", n));
        }
        ToolPayload::Task {
            description,
            tools_used,
            tokens,
        } => {
            entry.description = description;
            entry.details = Some(ToolDetails::Task(TaskDetails { tools_used, tokens }));
        }
        ToolPayload::TodoWrite { todos } => {
            entry.summary = Some(format!("{} todos", todos.len()));
            entry.details = Some(ToolDetails::Todos(todos));
        }
        ToolPayload::Other => {}
    }

    entry
}

/// One status entry per text block of every assistant turn.
pub fn notification_entries(transcript: &[TranscriptEntry]) -> Vec<TimelineEntry> {
    transcript
        .iter()
        .filter(|e| e.is_assistant())
        .flat_map(|e| {
            e.text_blocks()
                .into_iter()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| TimelineEntry::status(format!("{}{}", STATUS_BULLET, text), e.timestamp))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Stable ascending sort by timestamp. Entries without a timestamp stay in
/// their slot; the timestamped entries are ordered around them.
pub fn sort_timeline(entries: Vec<TimelineEntry>) -> Vec<TimelineEntry> {
    let mut slots: Vec<Option<TimelineEntry>> = Vec::with_capacity(entries.len());
    let mut positions = Vec::new();
    let mut timed = Vec::new();

    for entry in entries {
        if entry.timestamp.is_some() {
            positions.push(slots.len());
            timed.push(entry);
            slots.push(None);
        } else {
            slots.push(Some(entry));
        }
    }

    timed.sort_by_key(|e| e.timestamp);
    for (position, entry) in positions.into_iter().zip(timed) {
        slots[position] = Some(entry);
    }

    slots.into_iter().flatten().collect()
}

/// Merge tool executions and assistant narration into one ordered timeline.
pub fn build_timeline(hooks: &[HookLogEntry], transcript: &[TranscriptEntry]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = pair_tool_executions(hooks)
        .iter()
        .map(create_tool_entry)
        .collect();
    let tools = entries.len();

    entries.extend(notification_entries(transcript));
    debug!(tools, statuses = entries.len() - tools, "Built timeline");

    sort_timeline(entries)
}

/// The first real user request in the transcript.
pub fn extract_user_prompt(transcript: &[TranscriptEntry]) -> Option<String> {
    transcript
        .iter()
        .filter(|e| e.is_user())
        .filter_map(TranscriptEntry::string_content)
        .find(|content| !META_MARKERS.iter().any(|m| content.contains(m)))
        .map(|content| content.trim().to_string())
}

/// Input plus output tokens over every assistant turn.
pub fn total_tokens(transcript: &[TranscriptEntry]) -> u64 {
    transcript
        .iter()
        .filter(|e| e.is_assistant())
        .filter_map(TranscriptEntry::usage)
        .map(|u| u.total())
        .sum()
}

/// Distinct names of tools that finished, in order of first completion.
pub fn tools_used(hooks: &[HookLogEntry]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in hooks
        .iter()
        .filter(|e| e.is_post_tool_use())
        .filter_map(HookLogEntry::tool_name)
    {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Summary entry carrying filtered terminal output.
pub fn narrative_entry(text: &str, timestamp: Option<DateTime<Utc>>) -> TimelineEntry {
    TimelineEntry {
        timestamp,
        message: Some("Terminal output".to_string()),
        summary: Some(format!("{} lines", text.lines().count())),
        preview: Some(preview(text)),
        full_content: Some(text.to_string()),
        expandable: Some(true),
        ..TimelineEntry::new(EntryKind::Summary)
    }
}

fn preview(content: &str) -> String {
    content
        .lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}
