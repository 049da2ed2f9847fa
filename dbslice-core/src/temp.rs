//! Scoped ownership of the intermediate files an import run creates.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Records every intermediate artifact created during an import run
/// (decompressed singles, decompressed parts, merged artifacts) and deletes
/// them all when released, regardless of how the run ended.
#[derive(Debug, Default)]
pub struct TempFileSet {
    paths: Vec<PathBuf>,
}

impl TempFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an intermediate path for end-of-run deletion.
    pub fn register<P: Into<PathBuf>>(&mut self, path: P) {
        self.paths.push(path.into());
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Delete every recorded file. Best-effort: deletion failures are
    /// logged, never raised.
    pub fn release(&mut self) {
        for path in self.paths.drain(..) {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed temporary artifact {}", path.display()),
                Err(e) => warn!(
                    "failed to remove temporary artifact {}: {e}",
                    path.display()
                ),
            }
        }
    }
}

impl Drop for TempFileSet {
    fn drop(&mut self) {
        self.release();
    }
}
