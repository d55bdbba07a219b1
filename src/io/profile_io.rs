use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::model::profile::Profile;

/// Error type for profile store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a profile already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("no profile found at {0}")]
    Missing(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed profile {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize profile: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Where profiles are fetched from and saved to.
///
/// The engine never calls this; the layer around it does, and a failed save
/// never rolls back what the engine already shows.
pub trait ProfileStore {
    /// `Ok(None)` when no profile has been created yet
    fn fetch(&self) -> Result<Option<Profile>, StoreError>;

    /// Store a brand-new profile; fails if one exists
    fn create(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Overwrite the stored profile; fails if none exists
    fn update(&self, profile: &Profile) -> Result<(), StoreError>;
}

/// Profile kept as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileProfileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut content = serde_json::to_string_pretty(profile)?;
        content.push('\n');
        super::atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(
            "event=profile_save module=store status=ok bytes={}",
            content.len()
        );
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn fetch(&self) -> Result<Option<Profile>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        let profile = serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(profile))
    }

    fn create(&self, profile: &Profile) -> Result<(), StoreError> {
        if self.path.exists() {
            return Err(StoreError::AlreadyExists(self.path.clone()));
        }
        self.write(profile)?;
        info!("event=profile_create module=store status=ok profile={}", profile.id);
        Ok(())
    }

    fn update(&self, profile: &Profile) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()));
        }
        self.write(profile)
    }
}
