//! Agent status ledger.
//!
//! A single JSON file maps agent ids to their lifecycle record. Every mutation
//! is write-through: the whole file is rewritten before the call returns.
//! There is no locking, so two processes mutating the same file concurrently
//! lose updates (last writer wins). The ledger is meant for one coordinating
//! process invoking one CLI command at a time.

use crate::error::{PackError, Result};
use crate::timestamp;
use crate::types::AgentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    pub blocker: String,
    #[serde(with = "timestamp::required")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub role: String,
    pub task: String,
    pub status: AgentStatus,
    #[serde(with = "timestamp::required")]
    pub started: DateTime<Utc>,
    #[serde(with = "timestamp::required")]
    pub last_update: DateTime<Utc>,
    #[serde(default, with = "timestamp::optional")]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_log: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub commits: u32,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
}

impl AgentRecord {
    fn new(role: impl Into<String>, task: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            role: role.into(),
            task: task.into(),
            status: AgentStatus::Active,
            started: now,
            last_update: now,
            completed: None,
            work_log: None,
            notes: None,
            commits: 0,
            blockers: Vec::new(),
        }
    }
}

// Older status files stored whatever `update` coerced: numbers in text fields
// and strings in `commits`. Both are read back instead of rejecting the file.

fn lenient_text<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_count<'de, D>(d: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.map_or(0, |c| u32::try_from(c).unwrap_or(u32::MAX)))
}

/// The persisted aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentRecord>,
    #[serde(default, with = "timestamp::optional")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub orchestrator_id: Option<String>,
}

// ---------------------------------------------------------------------------
// AgentUpdate
// ---------------------------------------------------------------------------

/// The fields `update` may change. Identity and history (`role`, `task`,
/// `started`, `blockers`) are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentUpdate {
    pub status: Option<AgentStatus>,
    pub commits: Option<u32>,
    /// `Some(None)` clears the completion timestamp.
    pub completed: Option<Option<DateTime<Utc>>>,
    pub work_log: Option<String>,
    pub notes: Option<String>,
}

impl AgentUpdate {
    pub const FIELDS: &'static [&'static str] = &["status", "commits", "completed", "work_log", "notes"];

    const PROTECTED: &'static [&'static str] = &["role", "task", "started", "last_update", "blockers"];

    pub fn is_empty(&self) -> bool {
        *self == AgentUpdate::default()
    }

    /// Parse `key=value` arguments. Only `commits` is coerced to an integer;
    /// every other value keeps its textual form.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut update = AgentUpdate::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| PackError::Usage(format!("expected key=value, got '{pair}'")))?;
            update.set(key.trim(), value)?;
        }
        Ok(update)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "status" => self.status = Some(value.trim().parse()?),
            "commits" => {
                let commits = value.trim().parse::<u32>().map_err(|_| {
                    PackError::Usage(format!(
                        "commits must be a non-negative integer, got '{value}'"
                    ))
                })?;
                self.commits = Some(commits);
            }
            "completed" => {
                self.completed = Some(match value.trim() {
                    "now" => Some(Utc::now()),
                    "" | "none" | "null" => None,
                    raw => Some(timestamp::parse(raw)?),
                });
            }
            "work_log" => self.work_log = Some(value.to_string()),
            "notes" => self.notes = Some(value.to_string()),
            k if Self::PROTECTED.contains(&k) => {
                return Err(PackError::Usage(format!(
                    "field '{k}' cannot be changed with update"
                )));
            }
            other => {
                return Err(PackError::Usage(format!(
                    "unknown field '{other}': expected one of {}",
                    Self::FIELDS.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn apply(&self, record: &mut AgentRecord, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            if status == AgentStatus::Completed
                && record.completed.is_none()
                && self.completed.is_none()
            {
                record.completed = Some(now);
            }
            record.status = status;
        }
        if let Some(commits) = self.commits {
            record.commits = commits;
        }
        if let Some(completed) = self.completed {
            record.completed = completed;
        }
        if let Some(work_log) = &self.work_log {
            record.work_log = Some(work_log.clone());
        }
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
    }
}

impl fmt::Display for AgentUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(format!("status={status}"));
        }
        if let Some(commits) = self.commits {
            parts.push(format!("commits={commits}"));
        }
        if let Some(completed) = &self.completed {
            match completed {
                Some(ts) => parts.push(format!("completed={}", timestamp::format(ts))),
                None => parts.push("completed=none".to_string()),
            }
        }
        if let Some(work_log) = &self.work_log {
            parts.push(format!("work_log={work_log}"));
        }
        if let Some(notes) = &self.notes {
            parts.push(format!("notes={notes}"));
        }
        f.write_str(&parts.join(", "))
    }
}

/// Result of a mutation addressed to a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    UnknownAgent,
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        self == UpdateOutcome::Applied
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub role: String,
    pub task: String,
    pub status: AgentStatus,
    pub commits: u32,
    pub blockers: Vec<Blocker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: String,
    pub total_count: usize,
    pub active_count: usize,
    pub completed_count: usize,
    pub blocked_count: usize,
    pub agents: Vec<AgentSummary>,
}

impl Report {
    pub const EMPTY_SUMMARY: &'static str = "No agents registered";

    /// The report for a ledger with no registered agents.
    pub fn empty() -> Self {
        Self {
            summary: Self::EMPTY_SUMMARY.to_string(),
            total_count: 0,
            active_count: 0,
            completed_count: 0,
            blocked_count: 0,
            agents: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

// ---------------------------------------------------------------------------
// StatusLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StatusLedger {
    path: PathBuf,
    state: LedgerState,
}

impl StatusLedger {
    /// Load the ledger stored at `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty ledger; the next
    /// mutation overwrites whatever was there. This never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<LedgerState>(&data) {
                Ok(state) => state,
                Err(e) => {
                    tracing::debug!("status file {} is malformed, resetting: {e}", path.display());
                    LedgerState::default()
                }
            },
            Err(e) => {
                tracing::debug!("status file {} not loaded: {e}", path.display());
                LedgerState::default()
            }
        };
        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentRecord> {
        self.state.agents.get(agent_id)
    }

    pub fn len(&self) -> usize {
        self.state.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.agents.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.state)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    /// Next mutation timestamp, clamped so the ledger clock never runs backwards.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.state.last_update {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.state.last_update = Some(now);
        now
    }

    /// Insert or overwrite `agent_id` as a fresh active record.
    pub fn register(
        &mut self,
        agent_id: &str,
        role: &str,
        task: &str,
        orchestrator_id: &str,
    ) -> Result<()> {
        let now = self.tick();
        if self.state.agents.contains_key(agent_id) {
            tracing::debug!("re-registering agent {agent_id}, previous record replaced");
        }
        self.state
            .agents
            .insert(agent_id.to_string(), AgentRecord::new(role, task, now));
        self.state.orchestrator_id = Some(orchestrator_id.to_string());
        self.save()
    }

    /// Apply `update` to an existing record. Unknown ids are never created.
    pub fn update(&mut self, agent_id: &str, update: &AgentUpdate) -> Result<UpdateOutcome> {
        self.update_with(agent_id, |_| update.clone())
    }

    /// Mark `agent_id` completed. Prior state is not checked; repeating the
    /// call only refreshes the timestamps.
    pub fn mark_complete(&mut self, agent_id: &str) -> Result<UpdateOutcome> {
        self.update_with(agent_id, |now| AgentUpdate {
            status: Some(AgentStatus::Completed),
            completed: Some(Some(now)),
            ..AgentUpdate::default()
        })
    }

    /// Build the update from the ticked mutation time so every timestamp it
    /// sets agrees with `last_update`.
    fn update_with<F>(&mut self, agent_id: &str, build: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(DateTime<Utc>) -> AgentUpdate,
    {
        if !self.state.agents.contains_key(agent_id) {
            tracing::warn!("agent {agent_id} not registered, update ignored");
            return Ok(UpdateOutcome::UnknownAgent);
        }
        let now = self.tick();
        let update = build(now);
        if let Some(record) = self.state.agents.get_mut(agent_id) {
            update.apply(record, now);
            record.last_update = now;
        }
        self.save()?;
        Ok(UpdateOutcome::Applied)
    }

    /// Mark `agent_id` blocked and append `reason` to its blocker history.
    /// Unknown ids are ignored without a warning.
    pub fn mark_blocked(&mut self, agent_id: &str, reason: &str) -> Result<UpdateOutcome> {
        if !self.state.agents.contains_key(agent_id) {
            tracing::debug!("agent {agent_id} not registered, blocker dropped");
            return Ok(UpdateOutcome::UnknownAgent);
        }
        let now = self.tick();
        if let Some(record) = self.state.agents.get_mut(agent_id) {
            record.status = AgentStatus::Blocked;
            record.blockers.push(Blocker {
                blocker: reason.to_string(),
                timestamp: now,
            });
            record.last_update = now;
        }
        self.save()?;
        Ok(UpdateOutcome::Applied)
    }

    /// Aggregate the in-memory state into counts and per-agent summaries.
    pub fn generate_report(&self) -> Report {
        let agents = &self.state.agents;
        if agents.is_empty() {
            return Report::empty();
        }

        let count = |status: AgentStatus| agents.values().filter(|a| a.status == status).count();
        let active = count(AgentStatus::Active);
        let completed = count(AgentStatus::Completed);
        let blocked = count(AgentStatus::Blocked);
        let total = agents.len();

        Report {
            summary: format!(
                "{completed}/{total} completed, {active} active, {blocked} blocked"
            ),
            total_count: total,
            active_count: active,
            completed_count: completed,
            blocked_count: blocked,
            agents: agents
                .iter()
                .map(|(id, a)| AgentSummary {
                    id: id.clone(),
                    role: a.role.clone(),
                    task: a.task.clone(),
                    status: a.status,
                    commits: a.commits,
                    blockers: a.blockers.clone(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger(dir: &TempDir) -> StatusLedger {
        StatusLedger::load(dir.path().join(".claude/.agent-status.json"))
    }

    fn max_record_update(ledger: &StatusLedger) -> Option<DateTime<Utc>> {
        ledger.state().agents.values().map(|a| a.last_update).max()
    }

    #[test]
    fn register_counts_agent_as_active() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "implement parser", "orch-7").unwrap();

        let report = l.generate_report();
        assert_eq!(report.total_count, 1);
        assert_eq!(report.active_count, 1);
        assert_eq!(report.completed_count + report.blocked_count, 0);
        assert_eq!(l.state().orchestrator_id.as_deref(), Some("orch-7"));

        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.started, rec.last_update);
        assert!(rec.completed.is_none());
        assert_eq!(rec.commits, 0);
        assert!(rec.blockers.is_empty());
        assert!(l.path().exists());
    }

    #[test]
    fn no_agent_in_two_buckets() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        for id in ["a", "b", "c", "d"] {
            l.register(id, "Engineer", "work", "orch").unwrap();
        }
        l.mark_complete("a").unwrap();
        l.mark_blocked("b", "waiting").unwrap();
        l.mark_blocked("c", "waiting").unwrap();
        l.mark_complete("c").unwrap();

        let report = l.generate_report();
        assert_eq!(
            report.active_count + report.completed_count + report.blocked_count,
            report.total_count
        );
        assert_eq!(report.completed_count, 2);
        assert_eq!(report.blocked_count, 1);
        assert_eq!(report.active_count, 1);
        assert_eq!(report.summary, "2/4 completed, 1 active, 1 blocked");
    }

    #[test]
    fn reregistration_overwrites_and_last_orchestrator_wins() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "first", "orch-1").unwrap();
        l.mark_blocked("eng-1", "stuck").unwrap();
        l.register("other", "Tester", "tests", "orch-2").unwrap();
        l.register("eng-1", "Reviewer", "second", "orch-3").unwrap();

        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.role, "Reviewer");
        assert_eq!(rec.task, "second");
        assert_eq!(rec.status, AgentStatus::Active);
        assert!(rec.blockers.is_empty());
        assert_eq!(l.len(), 2);
        assert_eq!(l.state().orchestrator_id.as_deref(), Some("orch-3"));
    }

    #[test]
    fn update_unknown_agent_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();
        let before = l.state().clone();

        let update = AgentUpdate::from_pairs(["commits=5"]).unwrap();
        let outcome = l.update("ghost", &update).unwrap();

        assert_eq!(outcome, UpdateOutcome::UnknownAgent);
        assert_eq!(l.len(), 1);
        assert_eq!(l.state(), &before);
    }

    #[test]
    fn mark_blocked_unknown_agent_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        let outcome = l.mark_blocked("ghost", "reason").unwrap();
        assert_eq!(outcome, UpdateOutcome::UnknownAgent);
        assert!(l.is_empty());
        assert!(!l.path().exists());
    }

    #[test]
    fn mark_complete_is_idempotent_for_buckets() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();

        l.mark_complete("eng-1").unwrap();
        let first = l.agent("eng-1").unwrap().completed;
        assert!(first.is_some());
        let report = l.generate_report();
        assert_eq!((report.active_count, report.completed_count), (0, 1));

        l.mark_complete("eng-1").unwrap();
        let second = l.agent("eng-1").unwrap().completed;
        assert!(second >= first);
        let report = l.generate_report();
        assert_eq!((report.active_count, report.completed_count), (0, 1));
    }

    #[test]
    fn blockers_append_in_call_order() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();
        let reasons = ["first", "second", "third"];
        for r in reasons {
            l.mark_blocked("eng-1", r).unwrap();
        }

        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.status, AgentStatus::Blocked);
        let got: Vec<&str> = rec.blockers.iter().map(|b| b.blocker.as_str()).collect();
        assert_eq!(got, reasons);
        assert!(rec.blockers.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn ledger_timestamp_tracks_latest_record() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        assert!(l.state().last_update.is_none());

        let mut previous = None;
        l.register("a", "Engineer", "work", "orch").unwrap();
        for step in 0..4 {
            match step {
                0 => l.register("b", "Tester", "tests", "orch").unwrap(),
                1 => {
                    l.mark_blocked("a", "review").unwrap();
                }
                2 => {
                    l.update("b", &AgentUpdate::from_pairs(["commits=2"]).unwrap())
                        .unwrap();
                }
                _ => {
                    l.mark_complete("a").unwrap();
                }
            }
            let current = l.state().last_update;
            assert!(current >= previous);
            assert_eq!(current, max_record_update(&l));
            previous = current;
        }
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "implement parser", "orch-7").unwrap();
        l.register("qa-1", "Tester", "write tests", "orch-7").unwrap();
        l.update(
            "eng-1",
            &AgentUpdate::from_pairs(["commits=4", "work_log=.ai/tasks/parser/30-results.md"])
                .unwrap(),
        )
        .unwrap();
        l.mark_blocked("qa-1", "fixture missing").unwrap();

        let reloaded = StatusLedger::load(l.path());
        assert_eq!(reloaded.state(), l.state());
    }

    #[test]
    fn corrupted_file_loads_as_empty_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "{ not json").unwrap();

        let l = StatusLedger::load(&path);
        assert_eq!(l.state(), &LedgerState::default());
        assert!(l.state().last_update.is_none());
        assert!(l.state().orchestrator_id.is_none());
    }

    #[test]
    fn wrongly_shaped_file_loads_as_empty_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, r#"{"agents": {"x": {"role": 3}}}"#).unwrap();
        assert!(StatusLedger::load(&path).is_empty());
    }

    #[test]
    fn loads_offset_less_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(
            &path,
            r#"{
  "agents": {
    "eng-1": {
      "role": "Engineer",
      "task": "implement parser",
      "status": "blocked",
      "started": "2026-03-01T09:30:00.123456",
      "last_update": "2026-03-01T10:00:00",
      "completed": null,
      "work_log": null,
      "commits": 2,
      "blockers": [{"blocker": "waiting on review", "timestamp": "2026-03-01T10:00:00"}]
    }
  },
  "last_update": "2026-03-01T10:00:00",
  "orchestrator_id": "orch-7"
}"#,
        )
        .unwrap();

        let l = StatusLedger::load(&path);
        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.status, AgentStatus::Blocked);
        assert_eq!(rec.commits, 2);
        assert_eq!(rec.blockers.len(), 1);
        assert!(rec.notes.is_none());
    }

    #[test]
    fn local_wall_clock_timestamps_do_not_freeze_the_clock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        let written = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        let legacy = serde_json::json!({
            "agents": {
                "a": {
                    "role": "Engineer",
                    "task": "parser",
                    "status": "active",
                    "started": written,
                    "last_update": written,
                    "completed": null,
                    "commits": 0,
                    "blockers": []
                }
            },
            "last_update": written,
            "orchestrator_id": "orch-1"
        });
        std::fs::write(&path, legacy.to_string()).unwrap();

        let mut l = StatusLedger::load(&path);
        let loaded = l.state().last_update.unwrap();
        assert!((Utc::now() - loaded).num_seconds().abs() < 5);

        l.register("b", "Tester", "tests", "orch-1").unwrap();
        l.mark_blocked("a", "waiting").unwrap();
        l.mark_complete("b").unwrap();

        let b = l.agent("b").unwrap();
        let completed = b.completed.unwrap();
        assert!(b.started <= completed);
        assert_eq!(completed, b.last_update);
        assert_eq!(l.state().last_update, Some(completed));
        assert!(l.agent("a").unwrap().blockers[0].timestamp >= loaded);
    }

    #[test]
    fn completion_uses_the_ledger_clock() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();
        let ahead = Utc::now() + chrono::Duration::hours(1);
        l.state.last_update = Some(ahead);

        l.mark_complete("eng-1").unwrap();
        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.completed, Some(ahead));
        assert_eq!(rec.last_update, ahead);
        assert!(rec.started <= ahead);
    }

    #[test]
    fn legacy_coerced_values_load_without_losing_agents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(
            &path,
            r#"{
  "agents": {
    "eng-1": {
      "role": "Engineer", "task": "parser", "status": "active",
      "started": "2026-03-01T09:30:00", "last_update": "2026-03-01T09:30:00",
      "completed": null, "work_log": 42, "notes": 1.5, "commits": "3", "blockers": []
    },
    "eng-2": {
      "role": "Engineer", "task": "lexer", "status": "active",
      "started": "2026-03-01T09:31:00", "last_update": "2026-03-01T09:31:00",
      "completed": null, "work_log": "logs/eng-2.md", "notes": null, "commits": 1, "blockers": []
    }
  },
  "last_update": "2026-03-01T09:31:00",
  "orchestrator_id": "orch-7"
}"#,
        )
        .unwrap();

        let mut l = StatusLedger::load(&path);
        assert_eq!(l.len(), 2);
        let eng1 = l.agent("eng-1").unwrap();
        assert_eq!(eng1.work_log.as_deref(), Some("42"));
        assert_eq!(eng1.notes.as_deref(), Some("1.5"));
        assert_eq!(eng1.commits, 3);

        l.register("new", "Reviewer", "review", "orch-7").unwrap();
        let on_disk = StatusLedger::load(&path);
        let ids: Vec<&String> = on_disk.state().agents.keys().collect();
        assert_eq!(ids, ["eng-1", "eng-2", "new"]);
    }

    #[test]
    fn empty_report_has_distinct_shape() {
        let dir = TempDir::new().unwrap();
        let report = ledger(&dir).generate_report();
        assert_eq!(report, Report::empty());
        assert!(report.is_empty());
        assert_eq!(report.summary, "No agents registered");
        assert_eq!(
            (
                report.total_count,
                report.active_count,
                report.completed_count,
                report.blocked_count
            ),
            (0, 0, 0, 0)
        );
        assert!(report.agents.is_empty());
    }

    #[test]
    fn engineer_scenario() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "implement parser", "orch-7").unwrap();

        let update = AgentUpdate::from_pairs(["commits=3"]).unwrap();
        assert_eq!(l.update("eng-1", &update).unwrap(), UpdateOutcome::Applied);
        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.commits, 3);
        assert_eq!(rec.role, "Engineer");
        assert_eq!(rec.task, "implement parser");
        assert_eq!(rec.status, AgentStatus::Active);

        l.mark_blocked("eng-1", "waiting on review").unwrap();
        l.mark_complete("eng-1").unwrap();

        let report = l.generate_report();
        assert_eq!(report.completed_count, 1);
        assert_eq!(report.blocked_count, 0);
        assert_eq!(report.summary, "1/1 completed, 0 active, 0 blocked");
        let eng = &report.agents[0];
        assert_eq!(eng.id, "eng-1");
        assert_eq!(eng.commits, 3);
        assert_eq!(eng.blockers.len(), 1);
        assert_eq!(eng.blockers[0].blocker, "waiting on review");
        assert!(l.agent("eng-1").unwrap().completed.is_some());
    }

    #[test]
    fn update_status_completed_stamps_completion_once() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();
        l.update("eng-1", &AgentUpdate::from_pairs(["status=completed"]).unwrap())
            .unwrap();
        let first = l.agent("eng-1").unwrap().completed;
        assert!(first.is_some());

        l.update("eng-1", &AgentUpdate::from_pairs(["status=completed"]).unwrap())
            .unwrap();
        assert_eq!(l.agent("eng-1").unwrap().completed, first);
    }

    #[test]
    fn update_only_coerces_commits() {
        let update = AgentUpdate::from_pairs(["notes=42", "commits= 7 "]).unwrap();
        assert_eq!(update.notes.as_deref(), Some("42"));
        assert_eq!(update.commits, Some(7));
        assert_eq!(update.to_string(), "commits=7, notes=42");
    }

    #[test]
    fn update_rejects_structural_and_unknown_fields() {
        for pair in ["started=now", "blockers=[]", "role=Boss", "color=red", "commits=-1", "commits=x", "status=paused", "noequals"] {
            assert!(
                AgentUpdate::from_pairs([pair]).is_err(),
                "expected rejection: {pair}"
            );
        }
    }

    #[test]
    fn update_can_clear_completion() {
        let dir = TempDir::new().unwrap();
        let mut l = ledger(&dir);
        l.register("eng-1", "Engineer", "work", "orch").unwrap();
        l.mark_complete("eng-1").unwrap();
        l.update(
            "eng-1",
            &AgentUpdate::from_pairs(["status=active", "completed=none"]).unwrap(),
        )
        .unwrap();
        let rec = l.agent("eng-1").unwrap();
        assert_eq!(rec.status, AgentStatus::Active);
        assert!(rec.completed.is_none());
    }

    #[test]
    fn save_fails_when_path_is_a_directory() {
        let dir = TempDir::new().unwrap();
        let mut l = StatusLedger::load(dir.path());
        assert!(l.register("eng-1", "Engineer", "work", "orch").is_err());
    }
}
