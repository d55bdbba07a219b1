use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile file, relative to the data directory
    #[serde(default = "default_profile_file")]
    pub file: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            file: default_profile_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// trace | debug | info | warn | error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Show the completed section in `show` output
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            show_completed: true,
        }
    }
}

fn default_profile_file() -> String {
    "profile.json".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}
