use crate::config::TaskPacketConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// GateVerdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    /// The prompt is not implementation work.
    NotApplicable,
    /// Implementation work with at least one task packet present.
    Passed,
    /// Implementation work but the tasks directory does not exist.
    MissingTasksDir,
    /// Implementation work but the tasks directory holds no packet.
    NoActivePacket,
}

impl GateVerdict {
    pub fn is_blocked(self) -> bool {
        matches!(self, GateVerdict::MissingTasksDir | GateVerdict::NoActivePacket)
    }

    pub fn headline(self) -> &'static str {
        match self {
            GateVerdict::NotApplicable | GateVerdict::Passed => "gate passed",
            GateVerdict::MissingTasksDir => "GATE VIOLATION: No Task Packet",
            GateVerdict::NoActivePacket => "GATE VIOLATION: No Active Task Packet",
        }
    }
}

/// Payload the assistant passes to a prompt-submit hook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptInput {
    #[serde(default)]
    pub user_input: String,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// First configured keyword contained in `input`, compared case-insensitively.
pub fn matched_keyword<'a>(input: &str, keywords: &'a [String]) -> Option<&'a str> {
    let lowered = input.to_lowercase();
    keywords
        .iter()
        .map(|k| k.as_str())
        .filter(|k| !k.is_empty())
        .find(|k| lowered.contains(&k.to_lowercase()))
}

/// Task packets are the non-hidden subdirectories of `tasks_dir`.
pub fn task_packets(tasks_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(tasks_dir) else {
        return Vec::new();
    };
    let mut packets: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    packets.sort();
    packets
}

/// Decide whether `input` may proceed without a task packet.
pub fn check_task_packet(root: &Path, cfg: &TaskPacketConfig, input: &str) -> GateVerdict {
    if matched_keyword(input, &cfg.keywords).is_none() {
        return GateVerdict::NotApplicable;
    }

    let tasks_dir = cfg.tasks_path(root);
    if !tasks_dir.exists() {
        return GateVerdict::MissingTasksDir;
    }
    if task_packets(&tasks_dir).is_empty() {
        return GateVerdict::NoActivePacket;
    }
    GateVerdict::Passed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
