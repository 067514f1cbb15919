use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("framework directory not found: {0} (add ai-pack as a git submodule first)")]
    FrameworkMissing(String),

    #[error("template directory not found: {0} (try: git submodule update --remote .ai-pack)")]
    TemplatesMissing(String),

    #[error("invalid agent status '{0}': expected active, completed or blocked")]
    InvalidStatus(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PackError>;
