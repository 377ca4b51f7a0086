use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ansi::strip_ansi;

const LENGTH_WEIGHT: f64 = 0.2;
const POSITION_WEIGHT: f64 = 0.5;
const SUBSTRING_WEIGHT: f64 = 0.3;

/// Settings for [`TextSimilarityFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Score at or above which a line counts as a duplicate (0.0 - 1.0)
    pub threshold: f64,
    /// How many of the most recently kept lines a new line is compared against
    pub window_size: usize,
    /// Trimmed lines shorter than this are dropped, unless empty
    pub min_line_length: usize,
    /// Remove ANSI escape sequences before comparing
    pub strip_ansi: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            window_size: 5,
            min_line_length: 5,
            strip_ansi: true,
        }
    }
}

/// Drops lines that closely repeat one of the last few kept lines.
///
/// Owns its look-back window; use one instance per capture session and call
/// [`reset`](Self::reset) before reusing it for another.
#[derive(Debug, Clone)]
pub struct TextSimilarityFilter {
    config: SimilarityConfig,
    window: VecDeque<String>,
}

impl TextSimilarityFilter {
    pub fn new(config: SimilarityConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window_size),
            config,
        }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Filter multi-line text, returning the surviving lines joined by `\n`.
    pub fn filter(&mut self, text: &str) -> String {
        text.lines()
            .filter_map(|line| self.accept_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run a single line through the filter. Returns the line to emit, with
    /// ANSI codes removed when configured, or `None` if it was dropped.
    pub fn accept_line(&mut self, line: &str) -> Option<String> {
        let line = if self.config.strip_ansi {
            strip_ansi(line)
        } else {
            line.to_string()
        };
        let trimmed = line.trim();

        if trimmed.chars().count() < self.config.min_line_length {
            // Blank lines carry formatting; short fragments are noise.
            return trimmed.is_empty().then_some(line);
        }

        let duplicate = self
            .window
            .iter()
            .map(|seen| similarity(trimmed, seen))
            .find(|score| *score >= self.config.threshold);

        if let Some(score) = duplicate {
            trace!(score, line = trimmed, "Dropping near-duplicate line");
            return None;
        }

        if self.config.window_size > 0 {
            if self.window.len() == self.config.window_size {
                self.window.pop_front();
            }
            self.window.push_back(trimmed.to_string());
        }

        Some(line)
    }

    /// Clear the look-back window.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for TextSimilarityFilter {
    fn default() -> Self {
        Self::new(SimilarityConfig::default())
    }
}

/// Composite similarity of two strings in `[0.0, 1.0]`.
///
/// Weighted sum of length ratio (0.2), position-wise character matches over
/// the shorter string (0.5) and longest common substring over the longer
/// string (0.3). Identical strings score 1.0; an empty side scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longer = a.len().max(b.len()) as f64;
    let shorter = a.len().min(b.len());

    let length_score = 1.0 - (a.len() as f64 - b.len() as f64).abs() / longer;

    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    let position_score = matches as f64 / shorter as f64;

    let substring_score = longest_common_substring(&a, &b) as f64 / longer;

    LENGTH_WEIGHT * length_score + POSITION_WEIGHT * position_score + SUBSTRING_WEIGHT * substring_score
}

/// Length of the longest common substring, by dynamic programming over
/// matched suffixes. Keeps a single row.
fn longest_common_substring(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
