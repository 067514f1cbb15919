//! Orchestrator role enforcement.
//!
//! When recent conversation turns show the orchestrator role is active, the
//! orchestrator may only delegate: skills, file writes other than the plan
//! document, and build/test shell commands are violations.

use crate::config::EnforcementConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const MAX_COMMAND_PREVIEW: usize = 100;

// ---------------------------------------------------------------------------
// Hook payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    /// Conversation turns, oldest first. Entries that are not objects are ignored.
    #[serde(default)]
    pub conversation: Vec<Value>,
    #[serde(default, rename = "toolCalls")]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl ToolCall {
    fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub tool: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Role detection
// ---------------------------------------------------------------------------

/// Lower-cased text of one conversation message: either its string `content`
/// or the concatenated `text` items of a content list.
fn message_text(message: &Value) -> String {
    let Some(content) = message.get("content") else {
        return String::new();
    };
    match content {
        Value::String(s) => s.to_lowercase(),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .map(str::to_lowercase)
            .collect(),
        _ => String::new(),
    }
}

pub fn is_orchestrator_active(conversation: &[Value], cfg: &EnforcementConfig) -> bool {
    if conversation.is_empty() || cfg.context_window == 0 {
        return false;
    }
    let start = conversation.len().saturating_sub(cfg.context_window);
    let recent: String = conversation[start..].iter().map(message_text).collect();
    cfg.indicators
        .iter()
        .filter(|i| !i.is_empty())
        .any(|i| recent.contains(&i.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Tool call checks
// ---------------------------------------------------------------------------

fn check_bash(command: &str, cfg: &EnforcementConfig) -> bool {
    let trimmed = command.trim();
    let is_safe = cfg.safe_commands.iter().any(|s| trimmed.starts_with(s.as_str()));
    let has_forbidden = cfg
        .forbidden_commands
        .iter()
        .any(|p| command.contains(p.as_str()));
    !is_safe && has_forbidden
}

/// Violations among `calls`, in call order. Assumes the orchestrator is active.
pub fn check_tool_calls(calls: &[ToolCall], cfg: &EnforcementConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    for call in calls {
        let message = match call.name.as_str() {
            "Skill" => {
                let skill = call.input_str("skill").unwrap_or("unknown");
                Some(format!(
                    "Skill({skill}) - Skills are context only, use Task tool to spawn agents"
                ))
            }
            "Write" | "Edit" => {
                let path = call.input_str("file_path").unwrap_or("");
                if path.contains(cfg.plan_file.as_str()) {
                    None
                } else if call.name == "Write" {
                    Some(format!("Write to {path} (only {} allowed)", cfg.plan_file))
                } else {
                    Some(format!("Edit {path} (only {} allowed)", cfg.plan_file))
                }
            }
            "Bash" => {
                let command = call.input_str("command").unwrap_or("");
                check_bash(command, cfg).then(|| {
                    let preview: String = command.chars().take(MAX_COMMAND_PREVIEW).collect();
                    format!("Bash execution: {preview}")
                })
            }
            _ => None,
        };
        if let Some(message) = message {
            violations.push(Violation {
                tool: call.name.clone(),
                message,
            });
        }
    }
    violations
}

/// Full hook decision: no violations unless the orchestrator role is active.
pub fn evaluate(input: &HookInput, cfg: &EnforcementConfig) -> Vec<Violation> {
    if !is_orchestrator_active(&input.conversation, cfg) {
        return Vec::new();
    }
    check_tool_calls(&input.tool_calls, cfg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> EnforcementConfig {
        EnforcementConfig::default()
    }

    fn call(name: &str, input: Value) -> ToolCall {
        ToolCall {
            name: name.to_string(),
            input: input.as_object().cloned().unwrap_or_default(),
        }
    }

    fn orchestrator_turns() -> Vec<Value> {
        vec![json!({"role": "assistant", "content": "You are now acting as the **Orchestrator**."})]
    }

    #[test]
    fn detects_role_in_string_and_list_content() {
        assert!(is_orchestrator_active(&orchestrator_turns(), &cfg()));

        let listed = vec![json!({
            "role": "user",
            "content": [
                {"type": "image", "text": "orchestrator role"},
                {"type": "text", "text": "Run /ai-pack orchestrate now"}
            ]
        })];
        assert!(is_orchestrator_active(&listed, &cfg()));
    }

    #[test]
    fn ignores_non_text_items_and_plain_values() {
        let turns = vec![
            json!("orchestrator role"),
            json!({"content": [{"type": "image", "text": "orchestrator role"}]}),
            json!({"content": 7}),
        ];
        assert!(!is_orchestrator_active(&turns, &cfg()));
    }

    #[test]
    fn only_recent_window_is_scanned() {
        let mut turns = orchestrator_turns();
        for _ in 0..10 {
            turns.push(json!({"content": "unrelated chatter"}));
        }
        assert!(!is_orchestrator_active(&turns, &cfg()));
        turns.pop();
        assert!(is_orchestrator_active(&turns, &cfg()));
    }

    #[test]
    fn skill_is_always_a_violation() {
        let v = check_tool_calls(&[call("Skill", json!({"skill": "engineer"}))], &cfg());
        assert_eq!(v.len(), 1);
        assert!(v[0].message.starts_with("Skill(engineer)"));
    }

    #[test]
    fn writes_allowed_only_to_plan_file() {
        let calls = [
            call("Write", json!({"file_path": ".ai/tasks/login/10-plan.md"})),
            call("Edit", json!({"file_path": "src/main.rs"})),
            call("Write", json!({"file_path": "README.md"})),
        ];
        let v = check_tool_calls(&calls, &cfg());
        assert_eq!(
            v.iter().map(|v| v.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Edit src/main.rs (only 10-plan.md allowed)",
                "Write to README.md (only 10-plan.md allowed)",
            ]
        );
    }

    #[test]
    fn bash_safe_prefix_wins_over_forbidden_pattern() {
        let calls = [
            call("Bash", json!({"command": "cargo test --all"})),
            call("Bash", json!({"command": "git status"})),
            call("Bash", json!({"command": "  test -f out.txt > /dev/null"})),
            call("Bash", json!({"command": "echo hi >> notes.md"})),
            call("Read", json!({"file_path": "src/main.rs"})),
        ];
        let v = check_tool_calls(&calls, &cfg());
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].message, "Bash execution: cargo test --all");
        assert_eq!(v[1].tool, "Bash");
    }

    #[test]
    fn long_commands_are_truncated() {
        let long = format!("npm run {}", "x".repeat(200));
        let v = check_tool_calls(&[call("Bash", json!({"command": long}))], &cfg());
        assert_eq!(v[0].message.chars().count(), "Bash execution: ".len() + 100);
    }

    #[test]
    fn evaluate_allows_when_role_inactive() {
        let input = HookInput {
            conversation: vec![json!({"content": "act as engineer"})],
            tool_calls: vec![call("Bash", json!({"command": "cargo build"}))],
        };
        assert!(evaluate(&input, &cfg()).is_empty());
    }

    #[test]
    fn payload_parses_camel_case_tool_calls() {
        let input: HookInput = serde_json::from_str(
            r#"{"conversation": [{"content": "orchestrator role"}],
                "toolCalls": [{"name": "Bash", "input": {"command": "pytest -q"}}]}"#,
        )
        .unwrap();
        assert_eq!(evaluate(&input, &cfg()).len(), 1);
    }
}
