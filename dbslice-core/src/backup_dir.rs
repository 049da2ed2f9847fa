/*!
The shared backup directory holding transient dumps and durable compressed
artifacts.

Only one export or import run is assumed to operate on the directory at a
time; concurrent runs must be serialized by the caller.
*/

use crate::grouping;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on the backup directory.
#[derive(Debug, Clone)]
pub struct BackupDir {
    root: PathBuf,
}

impl BackupDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve an artifact name inside the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory (and a `.gitkeep` marker) if missing.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            fs::write(self.root.join(".gitkeep"), "")?;
        }
        Ok(())
    }

    /// Durable compressed artifact names, sorted, optionally restricted to
    /// names starting with `prefix`. A missing directory lists as empty.
    pub fn list_compressed(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".gz") {
                continue;
            }
            if let Some(prefix) = prefix {
                if !name.starts_with(prefix) {
                    continue;
                }
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Delete uncompressed leftovers (`*.sql` and bare `*.partNNN` files)
    /// from an interrupted earlier run.
    pub fn remove_stale_artifacts(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".sql") || grouping::is_bare_part_name(&name) {
                debug!("removing stale artifact {name}");
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}
