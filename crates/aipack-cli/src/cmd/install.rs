use crate::output::{print_json, print_table};
use anyhow::Context;
use aipack_core::{
    config::Config,
    install::{self, CopyOutcome, VerifyItem},
};
use std::path::Path;

/// `aipack install`: lay down `.claude/` from the framework templates and
/// scaffold `.ai/`.
pub fn run(root: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load .claude/aipack.yaml")?;
    let templates = install::check_prerequisites(root, &config)?;

    if !json {
        println!("Installing ai-pack integration in: {}", root.display());
        println!("  templates: {}", templates.display());
    }

    let copy = install::copy_templates(root, &templates, force)
        .with_context(|| format!("failed to copy {}", templates.display()))?;
    let executable =
        install::make_hooks_executable(root).context("failed to make hooks executable")?;
    let created = install::create_ai_directory(root).context("failed to create .ai/")?;
    let checks = install::verify_setup(root);
    let missing: Vec<&VerifyItem> = checks.iter().filter(|c| !c.present).collect();

    if json {
        print_json(&serde_json::json!({
            "copy": copy,
            "executable_hooks": executable,
            "created": created,
            "checks": checks,
            "complete": missing.is_empty(),
        }))?;
    } else {
        match &copy {
            CopyOutcome::Skipped => {
                println!("  exists:  .claude/ (use --force to replace it)");
            }
            CopyOutcome::Copied { files } => {
                for file in files {
                    println!("  created: {}", file.display());
                }
            }
        }
        for name in &executable {
            println!("  chmod +x: .claude/hooks/{name}");
        }
        for path in &created {
            println!("  created: {path}");
        }

        println!();
        let rows: Vec<Vec<String>> = checks
            .iter()
            .map(|c| {
                vec![
                    if c.present { "ok" } else { "MISSING" }.to_string(),
                    c.description.to_string(),
                    c.path.to_string(),
                ]
            })
            .collect();
        print_table(&["STATUS", "COMPONENT", "PATH"], &rows);
    }

    if !missing.is_empty() {
        let paths: Vec<&str> = missing.iter().map(|c| c.path).collect();
        anyhow::bail!("setup incomplete, missing: {}", paths.join(", "));
    }

    if !json {
        println!("\nai-pack integration installed.");
        println!("Next:");
        println!("  cp .ai-pack/templates/CLAUDE.md .   # then add project context");
        println!("  edit .ai/repo-overrides.md          # project-specific rules");
        println!("  /ai-pack task-init <name>           # start a task packet");
    }
    Ok(())
}
