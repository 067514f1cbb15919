use crate::output::print_json;
use anyhow::Context;
use aipack_core::{
    config::Config,
    install::{self, ClaudeMdStatus, Customizations, SettingsAction},
    paths,
};
use std::path::Path;

/// `aipack upgrade`: refresh framework-managed files in `.claude/`.
///
/// Project customizations (extra commands, skills, rules, hooks, settings) are
/// preserved. When any are found the command stops unless `--yes` is given.
pub fn run(root: &Path, yes: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load .claude/aipack.yaml")?;
    let templates = install::check_prerequisites(root, &config)?;

    let custom = install::detect_customizations(root).context("failed to scan .claude/")?;

    if !custom.is_empty() && !yes {
        if json {
            print_json(&serde_json::json!({
                "upgraded": false,
                "customizations": custom,
            }))?;
        } else {
            print_customizations(&custom);
            println!("\nFramework files would be updated and custom files preserved.");
            println!("Re-run with --yes to proceed.");
        }
        return Ok(());
    }

    let backup = install::backup_existing(root).context("failed to back up .claude/")?;
    let summary = install::update_integration(root, &templates, &custom, backup.as_deref())
        .with_context(|| match &backup {
            Some(b) => format!("upgrade failed; restore from {}", b.display()),
            None => "upgrade failed".to_string(),
        })?;
    let claude_md = install::check_claude_md(root).context("failed to read CLAUDE.md")?;

    if json {
        return print_json(&serde_json::json!({
            "upgraded": true,
            "backup": backup,
            "customizations": custom,
            "summary": summary,
            "claude_md": claude_md,
        }));
    }

    println!("Upgrading ai-pack integration in: {}", root.display());
    match &backup {
        Some(b) => println!("  backup:   {}", b.display()),
        None => println!("  backup:   none (no existing .claude/)"),
    }
    if !custom.is_empty() {
        print_customizations(&custom);
    }

    println!("\nUpdated:");
    println!("  {} commands", summary.commands);
    println!("  {} skills", summary.skills);
    println!("  {} rules", summary.rules);
    println!("  {} hooks", summary.hooks);
    match summary.settings {
        SettingsAction::Replaced => println!("  settings.json"),
        SettingsAction::SavedAsNew => {
            println!("  settings.json.new (custom settings.json kept, merge manually)");
        }
        SettingsAction::Absent => {}
    }
    if summary.readme {
        println!("  README.md");
    }

    match claude_md {
        ClaudeMdStatus::Missing => println!("\nCLAUDE.md: not found, skipped"),
        ClaudeMdStatus::HasIntegration => println!("\nCLAUDE.md: integration section present"),
        ClaudeMdStatus::NotFromTemplate => {
            println!("\nCLAUDE.md: not based on the ai-pack template, skipped")
        }
        ClaudeMdStatus::NeedsMerge => {
            println!("\nCLAUDE.md: missing the 'Claude Code Integration' section");
            println!("  merge it from {}", paths::CLAUDE_MD_TEMPLATE);
        }
    }

    if let (SettingsAction::SavedAsNew, Some(b)) = (summary.settings, &backup) {
        println!("\nManual action required:");
        println!("  review .claude/settings.json.new");
        println!("  compare with {}/settings.json", b.display());
    }

    println!("\nai-pack integration upgraded.");
    Ok(())
}

fn print_customizations(custom: &Customizations) {
    println!("Customizations detected:");
    let groups = [
        ("command", &custom.commands),
        ("skill", &custom.skills),
        ("rule", &custom.rules),
        ("hook", &custom.hooks),
    ];
    for (kind, names) in groups {
        for name in names {
            println!("  custom {kind}: {name}");
        }
    }
    if custom.custom_settings {
        println!("  custom settings.json (additional hooks)");
    }
}
