//! Installing and refreshing the assistant integration from framework templates.
//!
//! `.ai-pack/templates/.claude` is the source of truth for framework-managed
//! files. Project-specific commands, skills, rules and hooks living next to
//! them in `.claude/` are detected and left alone on upgrade.

use crate::config::Config;
use crate::error::{PackError, Result};
use crate::{io, paths};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const FRAMEWORK_COMMANDS: &[&str] = &[
    "task-init.md",
    "task-status.md",
    "orchestrate.md",
    "engineer.md",
    "review.md",
    "test.md",
    "inspect.md",
    "architect.md",
    "designer.md",
    "pm.md",
    "help.md",
];
pub const FRAMEWORK_SKILLS: &[&str] = &["orchestrator", "engineer"];
pub const FRAMEWORK_RULES: &[&str] = &["gates.md", "task-packets.md", "workflows.md"];
pub const FRAMEWORK_HOOKS: &[&str] = &["task-init.py", "task-status.py", "check-task-packet.py"];

const SKILL_FILE: &str = "SKILL.md";
const INTEGRATION_HEADING: &str = "Claude Code Integration";
const FRAMEWORK_GATES_REF: &str = ".ai-pack/gates/";

const AI_GITIGNORE_CONTENT: &str = "# AI-Pack workspace\n# Task packets are tracked\n";

const REPO_OVERRIDES_CONTENT: &str = r#"# Project-Specific Overrides

This file contains project-specific rules that override or extend the ai-pack framework defaults.

## Language/Technology

- Language: [e.g., Python, C#, JavaScript]
- Framework: [e.g., Django, .NET, React]

## Coding Standards

[Any project-specific coding standards that differ from .ai-pack/quality/]

## Testing Requirements

[Any project-specific testing requirements]

## Build/Deploy

[Project-specific build or deployment considerations]

## Notes

[Any other project-specific guidance for AI assistants]
"#;

// ---------------------------------------------------------------------------
// Prerequisites
// ---------------------------------------------------------------------------

/// Both the framework checkout and its template tree must exist.
/// Returns the template directory.
pub fn check_prerequisites(root: &Path, cfg: &Config) -> Result<PathBuf> {
    let framework = cfg.framework_path(root);
    if !framework.is_dir() {
        return Err(PackError::FrameworkMissing(framework.display().to_string()));
    }
    let templates = cfg.template_path(root);
    if !templates.is_dir() {
        return Err(PackError::TemplatesMissing(templates.display().to_string()));
    }
    Ok(templates)
}

// ---------------------------------------------------------------------------
// install
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CopyOutcome {
    /// `.claude/` already existed and was left untouched.
    Skipped,
    /// Files now present under `.claude/`, relative to the project root.
    Copied { files: Vec<PathBuf> },
}

/// Copy the template tree into `.claude/`. An existing `.claude/` is kept
/// unless `force` is set, in which case it is removed first.
pub fn copy_templates(root: &Path, templates: &Path, force: bool) -> Result<CopyOutcome> {
    let target = paths::claude_dir(root);
    if target.exists() {
        if !force {
            return Ok(CopyOutcome::Skipped);
        }
        tracing::debug!("removing existing {}", target.display());
        std::fs::remove_dir_all(&target)?;
    }
    io::copy_tree(templates, &target)?;
    let files = io::list_files(&target)?
        .into_iter()
        .map(|rel| PathBuf::from(paths::CLAUDE_DIR).join(rel))
        .collect();
    Ok(CopyOutcome::Copied { files })
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Mark every `.claude/hooks/*.py` executable. Returns the script names.
pub fn make_hooks_executable(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for script in files_with_extension(&paths::hooks_dir(root), "py")? {
        io::make_executable(&script)?;
        names.push(file_name(&script));
    }
    Ok(names)
}

/// Create `.ai/tasks/` plus the `.ai/` starter files that are missing.
/// Returns the paths that were created.
pub fn create_ai_directory(root: &Path) -> Result<Vec<&'static str>> {
    let mut created = Vec::new();
    let tasks = root.join(paths::TASKS_DIR);
    if !tasks.is_dir() {
        io::ensure_dir(&tasks)?;
        created.push(paths::TASKS_DIR);
    }
    if io::write_if_missing(&root.join(paths::AI_GITIGNORE), AI_GITIGNORE_CONTENT.as_bytes())? {
        created.push(paths::AI_GITIGNORE);
    }
    if io::write_if_missing(
        &root.join(paths::REPO_OVERRIDES),
        REPO_OVERRIDES_CONTENT.as_bytes(),
    )? {
        created.push(paths::REPO_OVERRIDES);
    }
    Ok(created)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyItem {
    pub path: &'static str,
    pub description: &'static str,
    pub present: bool,
}

pub fn verify_setup(root: &Path) -> Vec<VerifyItem> {
    const CHECKS: &[(&str, &str)] = &[
        (".claude/commands/ai-pack/", "Slash commands"),
        (".claude/skills/", "Auto-triggered skills"),
        (".claude/rules/", "Modular rules"),
        (".claude/hooks/", "Enforcement hooks"),
        (".claude/settings.json", "Hook configuration"),
        (".ai/tasks/", "Task packet directory"),
    ];
    CHECKS
        .iter()
        .map(|&(path, description)| VerifyItem {
            path,
            description,
            present: root.join(path).exists(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// upgrade
// ---------------------------------------------------------------------------

/// Copy `.claude/` to `.claude.backup.<YYYYmmdd_HHMMSS>/`. `None` when there
/// is nothing to back up.
pub fn backup_existing(root: &Path) -> Result<Option<PathBuf>> {
    let source = paths::claude_dir(root);
    if !source.exists() {
        return Ok(None);
    }
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = paths::backup_dir(root, &stamp);
    io::copy_tree(&source, &backup)?;
    Ok(Some(backup))
}

/// Project-owned files found next to the framework-managed ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Customizations {
    pub commands: Vec<String>,
    pub skills: Vec<String>,
    pub rules: Vec<String>,
    pub hooks: Vec<String>,
    pub custom_settings: bool,
}

impl Customizations {
    pub fn has_custom_files(&self) -> bool {
        !(self.commands.is_empty()
            && self.skills.is_empty()
            && self.rules.is_empty()
            && self.hooks.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_custom_files() && !self.custom_settings
    }
}

/// Whether `settings.json` registers hooks beyond the framework's single
/// prompt-submit check. Unreadable settings count as stock.
fn has_custom_settings(path: &Path) -> bool {
    let Ok(data) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(settings) = serde_json::from_str::<serde_json::Value>(&data) else {
        tracing::debug!("{} is not valid JSON, treating as stock", path.display());
        return false;
    };
    let Some(hooks) = settings.get("hooks").and_then(|h| h.as_object()) else {
        return false;
    };
    let extra_prompt_hooks = hooks
        .get("UserPromptSubmit")
        .and_then(|h| h.as_array())
        .is_some_and(|h| h.len() > 1);
    hooks.len() > 1 || extra_prompt_hooks
}

pub fn detect_customizations(root: &Path) -> Result<Customizations> {
    let mut found = Customizations::default();
    if !paths::claude_dir(root).exists() {
        return Ok(found);
    }

    for cmd in files_with_extension(&paths::commands_dir(root), "md")? {
        let name = file_name(&cmd);
        if !FRAMEWORK_COMMANDS.contains(&name.as_str()) {
            found.commands.push(name);
        }
    }

    let skills_dir = paths::skills_dir(root);
    if skills_dir.is_dir() {
        let mut skills: Vec<String> = std::fs::read_dir(&skills_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.join(SKILL_FILE).exists())
            .map(|p| file_name(&p))
            .filter(|name| !FRAMEWORK_SKILLS.contains(&name.as_str()))
            .collect();
        skills.sort();
        found.skills = skills;
    }

    for rule in files_with_extension(&paths::rules_dir(root), "md")? {
        let name = file_name(&rule);
        if !FRAMEWORK_RULES.contains(&name.as_str()) && name != paths::README_FILE {
            found.rules.push(name);
        }
    }

    for hook in files_with_extension(&paths::hooks_dir(root), "py")? {
        let name = file_name(&hook);
        if !FRAMEWORK_HOOKS.contains(&name.as_str()) {
            found.hooks.push(name);
        }
    }

    found.custom_settings = has_custom_settings(&paths::settings_path(root));
    Ok(found)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsAction {
    /// `settings.json` overwritten with the template.
    Replaced,
    /// Template written beside the customized file as `settings.json.new`.
    SavedAsNew,
    /// The template ships no `settings.json`.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateSummary {
    pub commands: usize,
    pub skills: usize,
    pub rules: usize,
    pub hooks: usize,
    pub settings: SettingsAction,
    pub readme: bool,
}

fn copy_files(files: &[PathBuf], dst: &Path) -> Result<usize> {
    for file in files {
        std::fs::copy(file, dst.join(file_name(file)))?;
    }
    Ok(files.len())
}

/// Overwrite framework-managed files from `templates`; project-owned files are
/// never touched.
pub fn update_integration(
    root: &Path,
    templates: &Path,
    custom: &Customizations,
    backup: Option<&Path>,
) -> Result<UpdateSummary> {
    let target = paths::claude_dir(root);
    let commands_dst = paths::commands_dir(root);
    let skills_dst = paths::skills_dir(root);
    let rules_dst = paths::rules_dir(root);
    let hooks_dst = paths::hooks_dir(root);
    for dir in [&commands_dst, &skills_dst, &rules_dst, &hooks_dst] {
        io::ensure_dir(dir)?;
    }

    let commands = copy_files(
        &files_with_extension(&templates.join(paths::COMMANDS_DIR), "md")?,
        &commands_dst,
    )?;

    let mut skills = 0;
    for skill in FRAMEWORK_SKILLS {
        let src = templates.join(paths::SKILLS_DIR).join(skill).join(SKILL_FILE);
        if src.exists() {
            let dst = skills_dst.join(skill);
            io::ensure_dir(&dst)?;
            std::fs::copy(&src, dst.join(SKILL_FILE))?;
            skills += 1;
        }
    }

    let rules = copy_files(
        &files_with_extension(&templates.join(paths::RULES_DIR), "md")?,
        &rules_dst,
    )?;

    let hook_files = files_with_extension(&templates.join(paths::HOOKS_DIR), "py")?;
    let hooks = copy_files(&hook_files, &hooks_dst)?;
    for hook in &hook_files {
        io::make_executable(&hooks_dst.join(file_name(hook)))?;
    }
    let hooks_readme = templates.join(paths::HOOKS_DIR).join(paths::README_FILE);
    if hooks_readme.exists() {
        std::fs::copy(&hooks_readme, hooks_dst.join(paths::README_FILE))?;
    }

    let settings_src = templates.join(paths::SETTINGS_FILE);
    let settings = if !settings_src.exists() {
        SettingsAction::Absent
    } else if custom.custom_settings && backup.is_some() {
        std::fs::copy(&settings_src, target.join(format!("{}.new", paths::SETTINGS_FILE)))?;
        SettingsAction::SavedAsNew
    } else {
        std::fs::copy(&settings_src, target.join(paths::SETTINGS_FILE))?;
        SettingsAction::Replaced
    };

    let readme_src = templates.join(paths::README_FILE);
    let readme = readme_src.exists();
    if readme {
        std::fs::copy(&readme_src, target.join(paths::README_FILE))?;
    }

    Ok(UpdateSummary {
        commands,
        skills,
        rules,
        hooks,
        settings,
        readme,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaudeMdStatus {
    Missing,
    HasIntegration,
    /// Not derived from the framework template; left alone.
    NotFromTemplate,
    /// Framework-derived but lacking the integration section.
    NeedsMerge,
}

pub fn check_claude_md(root: &Path) -> Result<ClaudeMdStatus> {
    let path = paths::claude_md_path(root);
    if !path.exists() {
        return Ok(ClaudeMdStatus::Missing);
    }
    let content = std::fs::read_to_string(&path)?;
    if content.contains(INTEGRATION_HEADING) {
        Ok(ClaudeMdStatus::HasIntegration)
    } else if !content.contains(FRAMEWORK_GATES_REF) {
        Ok(ClaudeMdStatus::NotFromTemplate)
    } else {
        Ok(ClaudeMdStatus::NeedsMerge)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
