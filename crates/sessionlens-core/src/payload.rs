//! Typed views over the loosely-shaped `tool_input` / `tool_response` blobs of
//! the tools the timeline knows how to enrich.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::types::TodoItem;

/// The tools whose payloads get dedicated timeline fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    /// `Write`, `Edit` and `MultiEdit`
    FileEdit(FileEditResponse),
    WebSearch {
        query: Option<String>,
        result_count: Option<usize>,
    },
    Task {
        description: Option<String>,
        tools_used: Option<u64>,
        tokens: Option<u64>,
    },
    TodoWrite {
        todos: Vec<TodoItem>,
    },
    /// Any other tool; only the base timeline fields apply
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileEditResponse {
    #[serde(default, alias = "filePath")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSearchInput {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskInput {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskResponse {
    #[serde(default, alias = "totalToolUseCount")]
    tools_used: Option<u64>,
    #[serde(default, alias = "totalTokens")]
    tokens: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TodoWriteInput {
    #[serde(default)]
    todos: Vec<TodoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoWriteResponse {
    #[serde(default)]
    new_todos: Option<Vec<TodoItem>>,
}

impl ToolPayload {
    /// Interpret the hook payloads of a tool call by exact tool name. Shapes
    /// that do not match degrade to empty fields, never to an error.
    pub fn from_hook(name: &str, input: Option<&Value>, response: Option<&Value>) -> Self {
        match name {
            "Write" | "Edit" | "MultiEdit" => ToolPayload::FileEdit(decode(response)),
            "WebSearch" => {
                let input: WebSearchInput = decode(input);
                let result_count = response
                    .filter(|r| r.is_object())
                    .map(|_| decode::<WebSearchResponse>(response).results.len());
                ToolPayload::WebSearch {
                    query: input.query,
                    result_count,
                }
            }
            "Task" => {
                let input: TaskInput = decode(input);
                let response: TaskResponse = decode(response);
                ToolPayload::Task {
                    description: input.description,
                    tools_used: response.tools_used,
                    tokens: response.tokens,
                }
            }
            "TodoWrite" => {
                let response: TodoWriteResponse = decode(response);
                let todos = match response.new_todos {
                    Some(todos) => todos,
                    None => decode::<TodoWriteInput>(input).todos,
                };
                ToolPayload::TodoWrite { todos }
            }
            _ => ToolPayload::Other,
        }
    }
}

fn decode<T: DeserializeOwned + Default>(value: Option<&Value>) -> T {
    value
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default()
}
