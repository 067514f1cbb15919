use crate::output::{print_json, rule};
use anyhow::Context;
use aipack_core::{
    config::Config,
    ledger::{AgentUpdate, Report, StatusLedger, UpdateOutcome},
};
use std::path::Path;

fn open_ledger(root: &Path) -> anyhow::Result<StatusLedger> {
    let config = Config::load(root).context("failed to load .claude/aipack.yaml")?;
    Ok(StatusLedger::load(config.status_path(root)))
}

pub fn register(
    root: &Path,
    agent_id: &str,
    role: &str,
    task: &str,
    orchestrator_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let mut ledger = open_ledger(root)?;
    ledger
        .register(agent_id, role, task, orchestrator_id)
        .with_context(|| format!("failed to save {}", ledger.path().display()))?;

    if json {
        print_json(&serde_json::json!({
            "agent_id": agent_id,
            "role": role,
            "task": task,
            "orchestrator_id": orchestrator_id,
            "status": "active",
        }))?;
    } else {
        println!("Registered agent: {agent_id} ({role})");
    }
    Ok(())
}

pub fn update(root: &Path, agent_id: &str, fields: &[String], json: bool) -> anyhow::Result<()> {
    let update = AgentUpdate::from_pairs(fields)?;
    let mut ledger = open_ledger(root)?;
    let outcome = ledger
        .update(agent_id, &update)
        .with_context(|| format!("failed to save {}", ledger.path().display()))?;

    if json {
        print_json(&serde_json::json!({
            "agent_id": agent_id,
            "updated": outcome.is_applied(),
            "fields": update.to_string(),
        }))?;
    } else if outcome == UpdateOutcome::Applied {
        println!("Updated agent: {agent_id} - {update}");
    }
    Ok(())
}

pub fn complete(root: &Path, agent_id: &str, json: bool) -> anyhow::Result<()> {
    let mut ledger = open_ledger(root)?;
    let outcome = ledger
        .mark_complete(agent_id)
        .with_context(|| format!("failed to save {}", ledger.path().display()))?;

    if json {
        print_json(&serde_json::json!({
            "agent_id": agent_id,
            "updated": outcome.is_applied(),
            "status": "completed",
        }))?;
    } else if outcome == UpdateOutcome::Applied {
        println!("Completed agent: {agent_id}");
    }
    Ok(())
}

pub fn blocked(root: &Path, agent_id: &str, reason: &str, json: bool) -> anyhow::Result<()> {
    let mut ledger = open_ledger(root)?;
    let outcome = ledger
        .mark_blocked(agent_id, reason)
        .with_context(|| format!("failed to save {}", ledger.path().display()))?;

    if json {
        print_json(&serde_json::json!({
            "agent_id": agent_id,
            "updated": outcome.is_applied(),
            "status": "blocked",
            "reason": reason,
        }))?;
    } else if outcome == UpdateOutcome::Applied {
        println!("Blocked agent: {agent_id}: {reason}");
    }
    Ok(())
}

pub fn report(root: &Path, json: bool) -> anyhow::Result<()> {
    let ledger = open_ledger(root)?;
    let report = ledger.generate_report();
    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &Report) {
    println!();
    println!("{}", rule());
    println!("AGENT STATUS REPORT");
    println!("{}", rule());
    println!("Summary: {}", report.summary);
    println!("Active: {}", report.active_count);
    println!("Completed: {}", report.completed_count);
    println!("Blocked: {}", report.blocked_count);
    println!();
    println!("Agent Details:");

    if report.is_empty() {
        println!("  (none)");
    }
    for agent in &report.agents {
        println!();
        println!("  {} {} ({})", agent.status.icon(), agent.id, agent.role);
        println!("     Task: {}", agent.task);
        println!("     Status: {}", agent.status);
        println!("     Commits: {}", agent.commits);
        if !agent.blockers.is_empty() {
            println!("     Blockers: {}", agent.blockers.len());
            for blocker in &agent.blockers {
                println!("       - {}", blocker.blocker);
            }
        }
    }
    println!("{}", rule());
    println!();
}
