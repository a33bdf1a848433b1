use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::config::config::StorageConfig;
use crate::utils::app_paths::AppPaths;

/// Stores each key as `<directory>/<encoded key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Use the configured directory, falling back to the data dir
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let directory = match &config.directory {
            Some(dir) => dir.clone(),
            None => AppPaths::columns_dir()?,
        };
        Ok(Self::new(directory))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", encode_key(key)))
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create {}", self.directory.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(target: "storage", "Ignoring unreadable column layout '{}': {:#}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: String) {
        if let Err(e) = self.write(key, &value) {
            tracing::warn!(target: "storage", "Could not persist column layout '{}': {:#}", key, e);
        }
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` so distinct keys map
/// to distinct, portable file names
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    if encoded.is_empty() {
        encoded.push('%');
    }
    encoded
}
