mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, hook::HookSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aipack",
    about = "ai-pack integration: agent status ledger, enforcement hooks, template installer",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .ai-pack/ or .git/)
    #[arg(long, global = true, env = "AIPACK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an agent as active (overwrites an existing record)
    Register {
        agent_id: String,
        role: String,
        task: String,
        orchestrator_id: String,
    },

    /// Update fields of a registered agent (status, commits, completed, work_log, notes)
    Update {
        agent_id: String,
        #[arg(required = true, value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Mark an agent completed
    Complete { agent_id: String },

    /// Mark an agent blocked and record the reason
    Blocked {
        agent_id: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        reason: Vec<String>,
    },

    /// Print the agent status report
    Report,

    /// Enforcement hooks invoked by the assistant (exit 2 blocks the action)
    Hook {
        #[command(subcommand)]
        subcommand: HookSubcommand,
    },

    /// Install the .claude/ integration from .ai-pack/templates
    Install {
        /// Replace an existing .claude/ directory
        #[arg(long)]
        force: bool,
    },

    /// Refresh framework files in .claude/, keeping project customizations
    Upgrade {
        /// Proceed even when customizations are detected
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Inspect and validate .claude/aipack.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    // Usage errors exit 1; clap's own default is 2, which hooks reserve for "block".
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Register {
            agent_id,
            role,
            task,
            orchestrator_id,
        } => cmd::agent::register(&root, &agent_id, &role, &task, &orchestrator_id, cli.json),
        Commands::Update { agent_id, fields } => {
            cmd::agent::update(&root, &agent_id, &fields, cli.json)
        }
        Commands::Complete { agent_id } => cmd::agent::complete(&root, &agent_id, cli.json),
        Commands::Blocked { agent_id, reason } => {
            cmd::agent::blocked(&root, &agent_id, &reason.join(" "), cli.json)
        }
        Commands::Report => cmd::agent::report(&root, cli.json),
        Commands::Hook { subcommand } => {
            let code = cmd::hook::run(&root, subcommand, cli.json);
            std::process::exit(code);
        }
        Commands::Install { force } => cmd::install::run(&root, force, cli.json),
        Commands::Upgrade { yes } => cmd::upgrade::run(&root, yes, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
