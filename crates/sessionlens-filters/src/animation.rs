use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ansi::{contains_box_drawing, is_box_drawing, strip_terminal_control};

/// Escape sequence pairs that erase a line and move the cursor back over it.
/// A chunk containing one is redrawing an existing region of the screen.
const CURSOR_REDRAW_IDIOMS: &[&str] = &[
    "\x1b[2K\x1b[1A",
    "\x1b[1A\x1b[2K",
    "\x1b[2K\x1b[G",
];

/// Lowercase phrases from the status bar and input box footer.
const CHROME_PHRASES: &[&str] = &[
    "esc to interrupt",
    "? for shortcuts",
    "shift+tab to cycle",
    "ctrl+c to exit",
    "ctrl+c again to exit",
    "auto-accept edits",
    "bypass permissions",
];

lazy_static! {
    /// Token-count footer, e.g. `↓ 1.2k tokens` or `350 tokens`.
    static ref TOKEN_FOOTER: Regex = Regex::new(r"(?i)\d+(?:\.\d+)?k?\s+tokens").unwrap();

    /// Spinner status lines, e.g. `✻ Thinking… (3s · esc to interrupt)`.
    static ref PROGRESS_LINE: Regex =
        Regex::new(r"^\s*[^\w\s]\s*[A-Za-z]{1,20}(?:…|\.{3})\s*\(").unwrap();
}

/// Settings for [`AnimationFrameDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Animation frames closer than this to the previous chunk are suppressed
    pub rate_gate_ms: i64,
    /// Stripped chunks at least this long are never treated as UI chrome
    pub max_frame_len: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rate_gate_ms: 100,
            max_frame_len: 200,
        }
    }
}

/// A chunk of terminal output and the approximate time it arrived.
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub data: String,
    pub received_at: DateTime<Utc>,
}

impl RawChunk {
    pub fn new(data: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            data: data.into(),
            received_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Redraw of UI state already on screen
    Animation,
    /// New information worth keeping
    Content,
}

/// Separates spinner and status-panel redraws from real output.
///
/// Holds the arrival time of the previous chunk and the meaningful lines seen
/// so far; one instance per capture session.
#[derive(Debug, Clone)]
pub struct AnimationFrameDetector {
    config: AnimationConfig,
    last_chunk_at: Option<DateTime<Utc>>,
    buffer: Vec<String>,
}

impl AnimationFrameDetector {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            last_chunk_at: None,
            buffer: Vec::new(),
        }
    }

    /// Classify a chunk without touching any state.
    pub fn classify(&self, chunk: &str) -> FrameKind {
        if CURSOR_REDRAW_IDIOMS.iter().any(|idiom| chunk.contains(idiom)) {
            return FrameKind::Animation;
        }

        let stripped = strip_terminal_control(chunk);
        if contains_box_drawing(&stripped)
            && stripped.chars().count() < self.config.max_frame_len
            && contains_chrome(&stripped)
        {
            return FrameKind::Animation;
        }

        FrameKind::Content
    }

    /// Process one chunk and return its meaningful text, or an empty string
    /// if nothing survives.
    pub fn process(&mut self, chunk: &RawChunk) -> String {
        let kind = self.classify(&chunk.data);
        let previous = self.last_chunk_at.replace(chunk.received_at);

        if kind == FrameKind::Animation {
            let rapid = previous
                .map(|prev| {
                    (chunk.received_at - prev).num_milliseconds() < self.config.rate_gate_ms
                })
                .unwrap_or(false);
            if rapid {
                trace!(len = chunk.data.len(), "Suppressing rapid animation frame");
                return String::new();
            }
        }

        let lines = extract_content(&chunk.data);
        let text = lines.join("\n");
        self.buffer.extend(lines);
        text
    }

    /// Drain the meaningful lines accumulated since the last flush.
    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.buffer).join("\n")
    }

    /// Forget the previous chunk time and any buffered lines.
    pub fn reset(&mut self) {
        self.last_chunk_at = None;
        self.buffer.clear();
    }
}

impl Default for AnimationFrameDetector {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

fn contains_chrome(text: &str) -> bool {
    let lower = text.to_lowercase();
    CHROME_PHRASES.iter().any(|p| lower.contains(p)) || TOKEN_FOOTER.is_match(&lower)
}

fn is_border_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| is_box_drawing(c) || c.is_whitespace())
}

/// Strip control sequences and drop border, chrome, blank and progress lines.
fn extract_content(chunk: &str) -> Vec<String> {
    strip_terminal_control(chunk)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_border_line(line))
        .filter(|line| !contains_chrome(line))
        .filter(|line| !PROGRESS_LINE.is_match(line))
        .map(str::to_string)
        .collect()
}
