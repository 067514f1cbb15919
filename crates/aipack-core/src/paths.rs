use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FRAMEWORK_DIR: &str = ".ai-pack";
pub const TEMPLATE_DIR: &str = ".ai-pack/templates/.claude";
pub const CLAUDE_MD_TEMPLATE: &str = ".ai-pack/templates/CLAUDE.md";

pub const CLAUDE_DIR: &str = ".claude";
pub const COMMANDS_DIR: &str = "commands/ai-pack";
pub const SKILLS_DIR: &str = "skills";
pub const RULES_DIR: &str = "rules";
pub const HOOKS_DIR: &str = "hooks";
pub const SETTINGS_FILE: &str = "settings.json";
pub const README_FILE: &str = "README.md";

pub const CONFIG_FILE: &str = ".claude/aipack.yaml";
pub const STATUS_FILE: &str = ".claude/.agent-status.json";

pub const TASKS_DIR: &str = ".ai/tasks";
pub const AI_GITIGNORE: &str = ".ai/.gitignore";
pub const REPO_OVERRIDES: &str = ".ai/repo-overrides.md";

pub const CLAUDE_MD: &str = "CLAUDE.md";

/// Prefix of timestamped `.claude/` backups made by `upgrade`.
pub const BACKUP_PREFIX: &str = ".claude.backup.";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn claude_dir(root: &Path) -> PathBuf {
    root.join(CLAUDE_DIR)
}

pub fn commands_dir(root: &Path) -> PathBuf {
    claude_dir(root).join(COMMANDS_DIR)
}

pub fn skills_dir(root: &Path) -> PathBuf {
    claude_dir(root).join(SKILLS_DIR)
}

pub fn rules_dir(root: &Path) -> PathBuf {
    claude_dir(root).join(RULES_DIR)
}

pub fn hooks_dir(root: &Path) -> PathBuf {
    claude_dir(root).join(HOOKS_DIR)
}

pub fn settings_path(root: &Path) -> PathBuf {
    claude_dir(root).join(SETTINGS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD)
}

pub fn backup_dir(root: &Path, stamp: &str) -> PathBuf {
    root.join(format!("{BACKUP_PREFIX}{stamp}"))
}

/// Resolve a configured path: absolute paths pass through, relative ones hang off `root`.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
