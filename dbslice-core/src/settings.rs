//! Connection settings and per-run pipeline configuration.
//!
//! Settings live in a small persisted JSON file; a placeholder with default
//! values is written when the file does not exist yet. The pipeline
//! configuration is an explicit value handed to each pipeline entry point,
//! never shared mutable state.

use crate::{Result, SliceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Raw dump artifacts above this size are split into parts (50 MiB).
pub const DEFAULT_CHUNK_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Database connection settings, persisted as a small JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Statements replayed after a successful import. Dispatched to the
    /// server concurrently and jointly awaited.
    #[serde(default)]
    pub post_import_sql: Vec<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            post_import_sql: Vec::new(),
        }
    }
}

impl ConnectionSettings {
    /// Load settings from `path`, writing a default placeholder file first
    /// if none exists.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.write(path)?;
            info!("created placeholder settings at {}", path.display());
            return Ok(defaults);
        }

        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            SliceError::config(format!("unreadable settings {}: {e}", path.display()))
        })
    }

    /// Persist the settings as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SliceError::config(format!("cannot encode settings: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Validate that the fields a connection needs are present.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SliceError::validation("host cannot be empty"));
        }
        if self.user.is_empty() {
            return Err(SliceError::validation("user cannot be empty"));
        }
        Ok(())
    }
}

/// Explicit per-run configuration handed to the pipelines.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Shared directory holding transient dumps and durable compressed
    /// artifacts.
    pub backup_dir: PathBuf,
    /// Split threshold in bytes for raw dump artifacts.
    pub chunk_threshold: u64,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(backup_dir: P) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
        }
    }

    pub fn with_chunk_threshold(mut self, threshold: u64) -> Self {
        self.chunk_threshold = threshold;
        self
    }
}
