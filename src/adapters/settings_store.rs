//! Settings storage adapters.
//!
//! Implements [`SettingsPort`] with a postcard blob, either in a file or in
//! memory.
//!
//! - Validation: blobs are range-checked on load and rejected as
//!   [`StorageError::Corrupted`] rather than clamped.
//! - Atomic writes: the file backend writes a sibling temp file and renames
//!   it over the old one.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{SettingsPort, StorageError};
use crate::config::PersistedSettings;

/// Settings kept in a single file.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsPort for FileSettingsStore {
    fn load_settings(&self) -> Result<Option<PersistedSettings>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Settings: no stored settings at {}", self.path.display());
                return Ok(None);
            }
            Err(_) => return Err(StorageError::Io),
        };
        let settings = PersistedSettings::from_bytes(&bytes)?;
        info!("Settings: loaded from {}", self.path.display());
        Ok(Some(settings))
    }

    fn save_settings(&mut self, settings: &PersistedSettings) -> Result<(), StorageError> {
        let bytes = settings.to_bytes()?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|_| StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(|_| StorageError::Io)?;
        Ok(())
    }
}

/// Settings kept in process memory; lost on exit.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    blob: Option<Vec<u8>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsPort for MemorySettingsStore {
    fn load_settings(&self) -> Result<Option<PersistedSettings>, StorageError> {
        self.blob.as_deref().map(PersistedSettings::from_bytes).transpose()
    }

    fn save_settings(&mut self, settings: &PersistedSettings) -> Result<(), StorageError> {
        self.blob = Some(settings.to_bytes()?);
        Ok(())
    }
}
