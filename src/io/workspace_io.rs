use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Name of the data directory that marks a tareas workspace
pub const DATA_DIR_NAME: &str = "tareas";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"[profile]
file = "profile.json"

[log]
level = "warn"

[view]
show_completed = true
"#;

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a tareas workspace: no tareas/ directory found (run `tareas init`)")]
    NotAWorkspace,
    #[error("tareas/ already exists at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A located workspace with its parsed configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `tareas/`
    pub root: PathBuf,
    /// The `tareas/` directory itself
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl Workspace {
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.profile.file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Walk up from `start` looking for a `tareas/` directory with a config file.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.is_dir() && data_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let data_dir = root.join(DATA_DIR_NAME);
    if !data_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&data_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        data_dir,
        config,
    })
}

/// Read and parse config.toml from the data directory
pub fn read_config(data_dir: &Path) -> Result<AppConfig, WorkspaceError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Create `tareas/` with a default config under `root`.
/// Refuses to touch an existing data directory unless `force` is set.
pub fn init_workspace(root: &Path, force: bool) -> Result<Workspace, WorkspaceError> {
    let data_dir = root.join(DATA_DIR_NAME);
    if data_dir.join(CONFIG_FILE).exists() && !force {
        return Err(WorkspaceError::AlreadyInitialized(root.to_path_buf()));
    }
    fs::create_dir_all(&data_dir)?;
    super::atomic_write(&data_dir.join(CONFIG_FILE), DEFAULT_CONFIG.as_bytes())?;
    load_workspace(root)
}
