use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AgentStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a tracked agent.
///
/// `Active` is entered only through registration. `Completed` is terminal for
/// the ledger's own operations; `Blocked` is left only by an explicit update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Completed,
    Blocked,
}

impl AgentStatus {
    pub fn all() -> &'static [AgentStatus] {
        &[AgentStatus::Active, AgentStatus::Completed, AgentStatus::Blocked]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Completed => "completed",
            AgentStatus::Blocked => "blocked",
        }
    }

    /// Marker shown next to the agent in console reports.
    pub fn icon(self) -> &'static str {
        match self {
            AgentStatus::Active => "🟢",
            AgentStatus::Completed => "✅",
            AgentStatus::Blocked => "🔴",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = crate::error::PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AgentStatus::Active),
            "completed" => Ok(AgentStatus::Completed),
            "blocked" => Ok(AgentStatus::Blocked),
            _ => Err(crate::error::PackError::InvalidStatus(s.to_string())),
        }
    }
}
