use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One line of the hook lifecycle log.
///
/// Entries carry no explicit id; their position in the log is their identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub data: HookData,
}

impl HookLogEntry {
    /// The `hook_event_name` of this entry, if any.
    pub fn event_name(&self) -> Option<&str> {
        self.data.hook_event_name.as_deref()
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.data.tool_name.as_deref()
    }

    pub fn is_pre_tool_use(&self) -> bool {
        self.event_name() == Some(PRE_TOOL_USE)
    }

    pub fn is_post_tool_use(&self) -> bool {
        self.event_name() == Some(POST_TOOL_USE)
    }
}

pub const PRE_TOOL_USE: &str = "PreToolUse";
pub const POST_TOOL_USE: &str = "PostToolUse";

/// Payload of a hook invocation. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    User,
    Assistant,
    System,
    /// Bookkeeping lines (summaries, snapshots) the pipeline does not use.
    #[serde(other)]
    Other,
}

/// One turn of the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    #[serde(rename = "type")]
    pub role: TranscriptRole,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<TranscriptMessage>,
    #[serde(default)]
    pub tool_use_result: Option<Value>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl TranscriptEntry {
    pub fn is_user(&self) -> bool {
        self.role == TranscriptRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == TranscriptRole::Assistant
    }

    /// Plain-string message content. Block-structured content returns `None`.
    pub fn string_content(&self) -> Option<&str> {
        match self.message.as_ref().map(|m| &m.content) {
            Some(MessageContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// All text blocks of the message, in order. A plain-string message is a
    /// single block.
    pub fn text_blocks(&self) -> Vec<&str> {
        match self.message.as_ref().map(|m| &m.content) {
            Some(MessageContent::Text(text)) => vec![text.as_str()],
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.message.as_ref().and_then(|m| m.usage.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Blocks(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Other,
}

/// Token usage block of an assistant message. Missing or null counts read
/// as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }
}

/// One record of a terminal capture log, as written by the capture wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    #[serde(default)]
    pub chunk_number: u64,
    #[serde(default)]
    pub length: usize,
    /// Shape varies between wrapper versions, so it is kept opaque.
    #[serde(default)]
    pub escape_sequences: Value,
    #[serde(default)]
    pub contains_clear_line: bool,
    #[serde(default)]
    pub contains_move_up: bool,
    #[serde(default)]
    pub visible_text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Raw chunk text including escape sequences, when the wrapper kept it.
    #[serde(default)]
    pub data: Option<String>,
}

/// Erase-line then cursor-up, restored in front of visible text when only the
/// redraw flags survived.
const REDRAW_PREFIX: &str = "\x1b[2K\x1b[1A";

impl CaptureRecord {
    /// Text to feed the filters: raw data when recorded, else the visible
    /// text. Without raw data, a record flagged as both clearing a line and
    /// moving up gets the redraw sequence back so it still reads as one.
    pub fn chunk_text(&self) -> Cow<'_, str> {
        match &self.data {
            Some(data) => Cow::Borrowed(data),
            None if self.is_redraw() => {
                Cow::Owned(format!("{}{}", REDRAW_PREFIX, self.visible_text))
            }
            None => Cow::Borrowed(&self.visible_text),
        }
    }

    pub fn is_redraw(&self) -> bool {
        self.contains_clear_line && self.contains_move_up
    }
}
