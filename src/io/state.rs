use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ops::view::ViewSnapshot;

const STATE_FILE: &str = ".state.json";

/// Persisted session state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Profile the view belongs to; a mismatch means the state is stale
    pub profile_id: String,
    /// Current list, picks and sort
    #[serde(default)]
    pub view: ViewSnapshot,
}

/// Read .state.json from the data directory
pub fn read_session_state(data_dir: &Path) -> Option<SessionState> {
    let path = data_dir.join(STATE_FILE);
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_session_state(data_dir: &Path, state: &SessionState) -> Result<(), std::io::Error> {
    let path = data_dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    super::atomic_write(&path, content.as_bytes())
}

/// Remove .state.json (sign-out). Missing file is fine.
pub fn clear_session_state(data_dir: &Path) -> Result<(), std::io::Error> {
    match fs::remove_file(data_dir.join(STATE_FILE)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
