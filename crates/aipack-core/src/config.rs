use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TaskPacketConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPacketConfig {
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: PathBuf,
    /// Words that mark a prompt as implementation work.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

fn default_tasks_dir() -> PathBuf {
    PathBuf::from(paths::TASKS_DIR)
}

fn default_keywords() -> Vec<String> {
    [
        "implement",
        "code",
        "write",
        "build",
        "create",
        "develop",
        "engineer",
        "orchestrate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for TaskPacketConfig {
    fn default() -> Self {
        Self {
            tasks_dir: default_tasks_dir(),
            keywords: default_keywords(),
        }
    }
}

impl TaskPacketConfig {
    /// Where task packets live, resolved against the project root.
    pub fn tasks_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.tasks_dir)
    }
}

// ---------------------------------------------------------------------------
// EnforcementConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// The only file the orchestrator may write or edit.
    #[serde(default = "default_plan_file")]
    pub plan_file: String,
    /// How many trailing conversation messages are scanned for role markers.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_indicators")]
    pub indicators: Vec<String>,
    #[serde(default = "default_safe_commands")]
    pub safe_commands: Vec<String>,
    #[serde(default = "default_forbidden_commands")]
    pub forbidden_commands: Vec<String>,
}

fn default_plan_file() -> String {
    "10-plan.md".to_string()
}

fn default_context_window() -> usize {
    10
}

fn default_indicators() -> Vec<String> {
    [
        "orchestrator role",
        "acting as the **orchestrator**",
        "/ai-pack orchestrate",
        "you are now acting as the **orchestrator**",
        "orchestrator - auto-activated",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_safe_commands() -> Vec<String> {
    [
        "cat .claude/settings.json",
        "grep -A",
        "test -f",
        "test -d",
        "ls ",
        "ls\n",
        "pwd",
        "which ",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_forbidden_commands() -> Vec<String> {
    [
        "dotnet test",
        "dotnet build",
        "npm test",
        "npm run",
        "pytest",
        "cargo test",
        "cargo build",
        "go test",
        "mvn test",
        "gradle test",
        ">",
        ">>",
        "echo",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            plan_file: default_plan_file(),
            context_window: default_context_window(),
            indicators: default_indicators(),
            safe_commands: default_safe_commands(),
            forbidden_commands: default_forbidden_commands(),
        }
    }
}

// ---------------------------------------------------------------------------
// InstallConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_framework_dir")]
    pub framework_dir: PathBuf,
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
}

fn default_framework_dir() -> PathBuf {
    PathBuf::from(paths::FRAMEWORK_DIR)
}

fn default_template_dir() -> PathBuf {
    PathBuf::from(paths::TEMPLATE_DIR)
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            framework_dir: default_framework_dir(),
            template_dir: default_template_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Contents of `.claude/aipack.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,
    #[serde(default)]
    pub task_packet: TaskPacketConfig,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

fn default_status_file() -> PathBuf {
    PathBuf::from(paths::STATUS_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_file: default_status_file(),
            task_packet: TaskPacketConfig::default(),
            enforcement: EnforcementConfig::default(),
            install: InstallConfig::default(),
        }
    }
}

impl Config {
    /// Load `.claude/aipack.yaml`, or the defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a malformed file degrades to the defaults.
    /// Hooks use this so a bad config never blocks the assistant.
    pub fn load_or_default(root: &Path) -> Self {
        match Config::load(root) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("ignoring unreadable {}: {e}", paths::CONFIG_FILE);
                Config::default()
            }
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn status_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.status_file)
    }

    pub fn framework_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.install.framework_dir)
    }

    pub fn template_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.install.template_dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.task_packet.keywords.iter().all(|k| k.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "task_packet.keywords is empty: the task packet gate never fires"
                    .to_string(),
            });
        }

        if self.enforcement.context_window == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "enforcement.context_window is 0: the orchestrator role is never detected"
                    .to_string(),
            });
        }

        if self.enforcement.plan_file.trim().is_empty() {
            // An empty needle matches every path, which disables the write filter.
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "enforcement.plan_file is empty: every Write/Edit would be allowed"
                    .to_string(),
            });
        }

        if self.status_file.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "status_file is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
