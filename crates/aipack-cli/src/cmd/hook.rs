//! Hook entry points. Exit codes: 0 allow, 2 block. Hooks fail open: a bad
//! payload or config never blocks the assistant.

use crate::output::{print_json, rule};
use aipack_core::{
    config::Config,
    enforcement::{self, HookInput, Violation},
    gate::{self, GateVerdict, PromptInput},
};
use clap::Subcommand;
use std::io::{IsTerminal, Read};
use std::path::Path;

const ALLOW: i32 = 0;
const BLOCK: i32 = 2;

#[derive(Subcommand)]
pub enum HookSubcommand {
    /// Require a task packet before implementation prompts
    TaskPacket {
        /// Prompt text, used when stdin carries no JSON payload
        words: Vec<String>,
    },
    /// Forbid execution tools while the orchestrator role is active
    Orchestrator,
}

pub fn run(root: &Path, subcmd: HookSubcommand, json: bool) -> i32 {
    let config = Config::load_or_default(root);
    match subcmd {
        HookSubcommand::TaskPacket { words } => task_packet(root, &config, &words, json),
        HookSubcommand::Orchestrator => orchestrator(&config, json),
    }
}

/// Stdin contents, or empty when stdin is an interactive terminal.
fn read_stdin() -> String {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return String::new();
    }
    let mut buf = String::new();
    if let Err(e) = stdin.read_to_string(&mut buf) {
        tracing::debug!("failed to read hook payload: {e}");
    }
    buf
}

// ---------------------------------------------------------------------------
// task-packet
// ---------------------------------------------------------------------------

fn task_packet(root: &Path, config: &Config, words: &[String], json: bool) -> i32 {
    let payload = read_stdin();
    let input = match serde_json::from_str::<PromptInput>(&payload) {
        Ok(p) => p.user_input,
        Err(_) => words.join(" "),
    };

    let verdict = gate::check_task_packet(root, &config.task_packet, &input);
    tracing::debug!("task packet gate: {verdict:?}");

    if json {
        let keyword = gate::matched_keyword(&input, &config.task_packet.keywords);
        if let Err(e) = print_json(&serde_json::json!({
            "verdict": verdict,
            "blocked": verdict.is_blocked(),
            "keyword": keyword,
        })) {
            tracing::debug!("failed to print verdict: {e}");
        }
    } else if verdict.is_blocked() {
        print_gate_violation(verdict);
    }

    if verdict.is_blocked() {
        BLOCK
    } else {
        ALLOW
    }
}

fn print_gate_violation(verdict: GateVerdict) {
    eprintln!("⚠️  {}", verdict.headline());
    eprintln!();
    eprintln!("Before implementation, create a task packet:");
    eprintln!("  /ai-pack task-init <task-name>");
    eprintln!();
    eprintln!("This is MANDATORY for all non-trivial tasks.");
    eprintln!();
    eprintln!("See: .ai-pack/gates/00-global-gates.md");
}

// ---------------------------------------------------------------------------
// orchestrator
// ---------------------------------------------------------------------------

fn orchestrator(config: &Config, json: bool) -> i32 {
    let payload = read_stdin();
    if payload.trim().is_empty() {
        return ALLOW;
    }
    let input: HookInput = match serde_json::from_str(&payload) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!("invalid hook payload, allowing: {e}");
            return ALLOW;
        }
    };

    let violations = enforcement::evaluate(&input, &config.enforcement);

    if json {
        if let Err(e) = print_json(&serde_json::json!({
            "blocked": !violations.is_empty(),
            "violations": violations,
        })) {
            tracing::debug!("failed to print violations: {e}");
        }
    } else if !violations.is_empty() {
        print_role_violation(&violations, &config.enforcement.plan_file);
    }

    if violations.is_empty() {
        ALLOW
    } else {
        BLOCK
    }
}

fn print_role_violation(violations: &[Violation], plan_file: &str) {
    eprintln!();
    eprintln!("{}", rule());
    eprintln!("🛑 ORCHESTRATOR ROLE VIOLATION BLOCKED");
    eprintln!("{}", rule());
    eprintln!();
    eprintln!("The Orchestrator role is attempting to use EXECUTION tools.");
    eprintln!("This violates the delegation pattern.");
    eprintln!();
    eprintln!("**Violations detected:**");
    for v in violations {
        eprintln!("  ❌ {v}");
    }
    eprintln!();
    eprintln!("**What Orchestrator MUST do instead:**");
    eprintln!("  ✅ Use Task(...) tool to spawn specialist agents");
    eprintln!("  ✅ Delegate execution to Engineer/Tester/Reviewer");
    eprintln!("  ✅ Only use Read tool for task packets and logs");
    eprintln!();
    eprintln!("**Orchestrator is NOT allowed to:**");
    eprintln!("  ❌ Run tests (dotnet test, npm test, etc.)");
    eprintln!("  ❌ Run builds (dotnet build, npm run, etc.)");
    eprintln!("  ❌ Write or Edit files (except {plan_file})");
    eprintln!("  ❌ Execute implementation work");
    eprintln!();
    eprintln!("**This submission has been BLOCKED.**");
    eprintln!("Spawn agents using Task tool instead.");
    eprintln!("{}", rule());
    eprintln!();
}
