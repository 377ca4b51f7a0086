use serde::{Deserialize, Serialize};
use tracing::debug;

use sessionlens_ingest::TranscriptEntry;

use crate::types::{EntryKind, TimelineEntry, TodoStatus};

const SUCCESS_KEYWORDS: &[&str] = &[
    "completed",
    "done",
    "finished",
    "successfully",
    "created",
    "implemented",
    "fixed",
    "resolved",
    "all tests pass",
    "build succeeded",
    "no errors",
];

const FAILURE_KEYWORDS: &[&str] = &[
    "failed",
    "error",
    "unable",
    "cannot",
    "issue",
    "problem",
    "blocked",
    "stuck",
    "unresolved",
    "tests failing",
    "build failed",
    "type error",
];

/// Tuning knobs for [`SuccessClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Fraction of completed todos below which a session fails (0.0 - 1.0)
    pub todo_completion_threshold: f64,
    /// How many trailing assistant messages are scanned for keywords
    pub recent_messages: usize,
    /// Timelines shorter than this are treated as abandoned
    pub min_timeline_entries: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            todo_completion_threshold: 0.8,
            recent_messages: 5,
            min_timeline_entries: 3,
        }
    }
}

/// The classifier's call on a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub success: bool,
    pub reason: String,
    /// The rule that decided
    pub rule: Rule,
}

impl Verdict {
    fn success(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
            rule,
        }
    }

    fn failure(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
            rule,
        }
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Decided(Verdict),
    FallThrough,
}

/// Heuristics in priority order. The first one to decide wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ErrorEntries,
    AbruptToolEnding,
    TodoCompletion,
    MissingCompletionMessages,
    MinimalActivity,
    KeywordBalance,
}

impl Rule {
    pub const ORDER: [Rule; 6] = [
        Rule::ErrorEntries,
        Rule::AbruptToolEnding,
        Rule::TodoCompletion,
        Rule::MissingCompletionMessages,
        Rule::MinimalActivity,
        Rule::KeywordBalance,
    ];

    pub fn evaluate(self, evidence: &Evidence<'_>, config: &ClassifierConfig) -> RuleOutcome {
        match self {
            Rule::ErrorEntries => evaluate_error_entries(evidence),
            Rule::AbruptToolEnding => evaluate_abrupt_ending(evidence),
            Rule::TodoCompletion => evaluate_todos(evidence, config),
            Rule::MissingCompletionMessages => evaluate_missing_messages(evidence),
            Rule::MinimalActivity => evaluate_minimal_activity(evidence, config),
            Rule::KeywordBalance => evaluate_keywords(evidence),
        }
    }
}

/// Keyword occurrence counts over the recent assistant messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordScores {
    pub success: usize,
    pub failure: usize,
}

impl KeywordScores {
    pub fn score(messages: &[String]) -> Self {
        let mut scores = Self::default();
        for message in messages {
            let lower = message.to_lowercase();
            scores.success += count_keywords(&lower, SUCCESS_KEYWORDS);
            scores.failure += count_keywords(&lower, FAILURE_KEYWORDS);
        }
        scores
    }
}

fn count_keywords(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|k| text.matches(k).count()).sum()
}

/// Everything the rules look at, gathered once.
#[derive(Debug)]
pub struct Evidence<'a> {
    pub timeline: &'a [TimelineEntry],
    /// Trailing assistant free-text messages, oldest first
    pub recent_messages: Vec<String>,
    pub scores: KeywordScores,
}

impl<'a> Evidence<'a> {
    pub fn gather(
        timeline: &'a [TimelineEntry],
        transcript: &[TranscriptEntry],
        config: &ClassifierConfig,
    ) -> Self {
        let messages: Vec<String> = transcript
            .iter()
            .filter(|e| e.is_assistant())
            .map(|e| e.text_blocks().join("\n"))
            .filter(|text| !text.trim().is_empty())
            .collect();
        let skip = messages.len().saturating_sub(config.recent_messages);
        let recent_messages: Vec<String> = messages.into_iter().skip(skip).collect();
        let scores = KeywordScores::score(&recent_messages);

        Self {
            timeline,
            recent_messages,
            scores,
        }
    }

    fn any_tool_ran(&self) -> bool {
        self.timeline.iter().any(TimelineEntry::is_tool)
    }
}

fn evaluate_error_entries(evidence: &Evidence<'_>) -> RuleOutcome {
    if evidence.timeline.iter().any(|e| e.kind == EntryKind::Error) {
        return RuleOutcome::Decided(Verdict::failure(
            Rule::ErrorEntries,
            "timeline contains error entries",
        ));
    }
    RuleOutcome::FallThrough
}

// A todo update as the final event is left to the todo rule.
fn evaluate_abrupt_ending(evidence: &Evidence<'_>) -> RuleOutcome {
    match evidence.timeline.last() {
        Some(last) if last.is_tool() && !last.is_tool_named(TODO_WRITE) => {
            let name = last.name.as_deref().unwrap_or("unknown");
            RuleOutcome::Decided(Verdict::failure(
                Rule::AbruptToolEnding,
                format!("ended abruptly during {} execution", name),
            ))
        }
        _ => RuleOutcome::FallThrough,
    }
}

const TODO_WRITE: &str = "TodoWrite";

fn evaluate_todos(evidence: &Evidence<'_>, config: &ClassifierConfig) -> RuleOutcome {
    let Some(update) = evidence
        .timeline
        .iter()
        .rev()
        .find(|e| e.is_tool_named(TODO_WRITE))
    else {
        return RuleOutcome::FallThrough;
    };

    let todos = update.todos().unwrap_or_default();
    let total = todos.len();
    let completed = todos
        .iter()
        .filter(|t| t.status == TodoStatus::Completed)
        .count();

    if total > 0 && completed == total {
        return RuleOutcome::Decided(Verdict::success(
            Rule::TodoCompletion,
            format!("all {} todos completed", total),
        ));
    }

    if total > 0 {
        let ratio = completed as f64 / total as f64;
        if ratio < config.todo_completion_threshold {
            return RuleOutcome::Decided(Verdict::failure(
                Rule::TodoCompletion,
                format!(
                    "only {:.0}% of todos completed ({}/{})",
                    ratio * 100.0,
                    completed,
                    total
                ),
            ));
        }
    }

    let ends_on_update = evidence
        .timeline
        .last()
        .is_some_and(|last| std::ptr::eq(last, update));
    let in_progress = todos.iter().any(|t| t.status == TodoStatus::InProgress);
    if ends_on_update && in_progress {
        return RuleOutcome::Decided(Verdict::failure(
            Rule::TodoCompletion,
            "ended with todos still in progress",
        ));
    }

    RuleOutcome::FallThrough
}

fn evaluate_missing_messages(evidence: &Evidence<'_>) -> RuleOutcome {
    if evidence.recent_messages.is_empty() && evidence.any_tool_ran() {
        return RuleOutcome::Decided(Verdict::failure(
            Rule::MissingCompletionMessages,
            "no completion messages found after tool executions",
        ));
    }
    RuleOutcome::FallThrough
}

fn evaluate_minimal_activity(evidence: &Evidence<'_>, config: &ClassifierConfig) -> RuleOutcome {
    if evidence.timeline.len() < config.min_timeline_entries {
        return RuleOutcome::Decided(Verdict::failure(
            Rule::MinimalActivity,
            "terminated early with minimal activity",
        ));
    }
    RuleOutcome::FallThrough
}

fn evaluate_keywords(evidence: &Evidence<'_>) -> RuleOutcome {
    let KeywordScores { success, failure } = evidence.scores;

    let verdict = if failure > success {
        Verdict::failure(
            Rule::KeywordBalance,
            format!(
                "failure indicators ({}) outweigh success indicators ({})",
                failure, success
            ),
        )
    } else if success > 0 {
        Verdict::success(
            Rule::KeywordBalance,
            format!("found {} success indicators in final messages", success),
        )
    } else {
        Verdict::failure(Rule::KeywordBalance, NO_CLEAR_SIGNAL)
    };

    RuleOutcome::Decided(verdict)
}

const NO_CLEAR_SIGNAL: &str = "no clear success indicators found";

/// Decides whether a session achieved what it set out to do.
#[derive(Debug, Clone, Default)]
pub struct SuccessClassifier {
    config: ClassifierConfig,
}

impl SuccessClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, timeline: &[TimelineEntry], transcript: &[TranscriptEntry]) -> Verdict {
        let evidence = Evidence::gather(timeline, transcript, &self.config);

        for rule in Rule::ORDER {
            if let RuleOutcome::Decided(verdict) = rule.evaluate(&evidence, &self.config) {
                debug!(?rule, success = verdict.success, reason = %verdict.reason, "Classified session");
                return verdict;
            }
        }

        Verdict::failure(Rule::KeywordBalance, NO_CLEAR_SIGNAL)
    }
}
