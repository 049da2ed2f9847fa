/*!
Import orchestration: discover the durable artifacts, regroup them,
reconstruct split dumps, replay everything through the generated restore
script, and clean up.

Singles and groups are processed one at a time; only the post-import
statements run concurrently. Temporary artifacts are released on every
exit path, success or failure.
*/

use crate::backup_dir::BackupDir;
use crate::codec::ArtifactCodec;
use crate::db::DatabaseClient;
use crate::grouping::group_artifacts;
use crate::merge::merge_group;
use crate::script::{write_script, ScriptPlatform};
use crate::settings::{ConnectionSettings, PipelineConfig};
use crate::temp::TempFileSet;
use crate::{Result, SliceError};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// What one import run restored.
#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    /// Whole dumps restored from a single compressed artifact.
    pub singles: usize,
    /// Split dumps reconstructed from part groups.
    pub groups: usize,
}

impl ImportReport {
    pub fn restored(&self) -> usize {
        self.singles + self.groups
    }
}

/// Orchestrates one import run.
pub struct ImportPipeline<'a, D, C> {
    config: &'a PipelineConfig,
    settings: &'a ConnectionSettings,
    db: &'a D,
    codec: &'a C,
    platform: ScriptPlatform,
}

impl<'a, D, C> ImportPipeline<'a, D, C>
where
    D: DatabaseClient,
    C: ArtifactCodec,
{
    pub fn new(
        config: &'a PipelineConfig,
        settings: &'a ConnectionSettings,
        db: &'a D,
        codec: &'a C,
    ) -> Self {
        Self {
            config,
            settings,
            db,
            codec,
            platform: ScriptPlatform::current(),
        }
    }

    /// Override the script platform (the host platform by default).
    pub fn with_platform(mut self, platform: ScriptPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Run one import over artifacts whose name starts with `prefix` (all
    /// artifacts when absent).
    ///
    /// An empty backup directory is reported, not an error. Everything the
    /// run creates on disk is deleted before returning, whether the run
    /// succeeded or not.
    pub async fn run(&self, prefix: Option<&str>) -> Result<ImportReport> {
        let dir = BackupDir::new(&self.config.backup_dir);
        dir.remove_stale_artifacts()?;

        let mut temps = TempFileSet::new();
        let result = self.run_inner(&dir, prefix, &mut temps).await;
        temps.release();
        result
    }

    async fn run_inner(
        &self,
        dir: &BackupDir,
        prefix: Option<&str>,
        temps: &mut TempFileSet,
    ) -> Result<ImportReport> {
        let names = dir.list_compressed(prefix)?;
        if names.is_empty() {
            warn!(
                "no compressed artifacts found in {}",
                dir.path().display()
            );
            return Ok(ImportReport::default());
        }

        let grouped = group_artifacts(names);
        let report = ImportReport {
            singles: grouped.singles.len(),
            groups: grouped.groups.len(),
        };

        let mut restorables: Vec<PathBuf> = Vec::new();
        for single in &grouped.singles {
            let decompressed = self.codec.decompress_path(&dir.join(single))?;
            temps.register(&decompressed);
            restorables.push(decompressed);
        }
        for (base, parts) in &grouped.groups {
            restorables.push(merge_group(dir.path(), base, parts, self.codec, temps)?);
        }

        let script = write_script(dir.path(), self.platform, self.settings, &restorables)?;
        self.execute_script(&script).await?;
        self.run_fixups().await?;

        info!(
            "import complete: {} single(s), {} group(s)",
            report.singles, report.groups
        );
        Ok(report)
    }

    async fn execute_script(&self, script: &Path) -> Result<()> {
        let status = match self.platform {
            ScriptPlatform::Sh => Command::new("/bin/bash").arg(script).status().await?,
            ScriptPlatform::Bat => Command::new("cmd").arg("/C").arg(script).status().await?,
        };
        if !status.success() {
            return Err(SliceError::process(script.to_string_lossy(), status));
        }
        Ok(())
    }

    /// Dispatch the configured post-import statements concurrently and wait
    /// for all of them.
    async fn run_fixups(&self) -> Result<()> {
        if self.settings.post_import_sql.is_empty() {
            return Ok(());
        }
        try_join_all(
            self.settings
                .post_import_sql
                .iter()
                .map(|stmt| self.db.execute_sql(self.settings, stmt)),
        )
        .await?;
        info!(
            "ran {} post-import statement(s)",
            self.settings.post_import_sql.len()
        );
        Ok(())
    }
}
