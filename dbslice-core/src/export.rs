/*!
Export orchestration: dump each unit, split oversized dumps, compress every
part into the durable artifact set.

Units are processed strictly one at a time. There is no per-unit isolation:
the first dump, split, or compression failure aborts the whole batch and
the remaining units are never touched.
*/

use crate::backup_dir::BackupDir;
use crate::codec::ArtifactCodec;
use crate::db::DatabaseClient;
use crate::settings::{ConnectionSettings, PipelineConfig};
use crate::split::{split_by_lines, SplitOutcome};
use crate::{Result, SliceError};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Suffix for raw (uncompressed) dump artifacts.
pub const DUMP_SUFFIX: &str = ".sql";

/// Orchestrates one export run.
pub struct ExportPipeline<'a, D, C> {
    config: &'a PipelineConfig,
    settings: &'a ConnectionSettings,
    db: &'a D,
    codec: &'a C,
}

impl<'a, D, C> ExportPipeline<'a, D, C>
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
        }
    }

    /// Export every unit whose name starts with `prefix` (all units when
    /// absent), returning the durable artifact paths in production order.
    ///
    /// Refuses to run when the selection is empty.
    pub async fn run(&self, prefix: Option<&str>) -> Result<Vec<PathBuf>> {
        self.settings.validate()?;

        let mut units = self.db.list_units(self.settings).await?;
        if let Some(prefix) = prefix {
            units.retain(|unit| unit.starts_with(prefix));
        }
        if units.is_empty() {
            return Err(SliceError::validation("no databases match the requested export"));
        }

        let dir = BackupDir::new(&self.config.backup_dir);
        dir.ensure_exists()?;

        let mut artifacts = Vec::new();
        for unit in &units {
            artifacts.extend(self.export_unit(&dir, unit).await?);
        }

        info!(
            "exported {} units into {} artifacts",
            units.len(),
            artifacts.len()
        );
        Ok(artifacts)
    }

    /// Dump one unit, split it when oversized, and compress every part.
    async fn export_unit(&self, dir: &BackupDir, unit: &str) -> Result<Vec<PathBuf>> {
        let raw = dir.join(&format!("{unit}{DUMP_SUFFIX}"));
        self.db.dump_unit(self.settings, unit, &raw).await?;

        let raw_size = fs::metadata(&raw)?.len();
        let outcome = if raw_size > self.config.chunk_threshold {
            let outcome = split_by_lines(&raw, self.config.chunk_threshold)?;
            if matches!(outcome, SplitOutcome::Parts(_)) {
                fs::remove_file(&raw)?;
            }
            outcome
        } else {
            SplitOutcome::Whole(raw)
        };

        let mut compressed = Vec::new();
        for part in outcome.into_paths() {
            compressed.push(self.codec.compress_path(&part)?);
        }
        info!("{unit}: {} compressed artifact(s)", compressed.len());
        Ok(compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::GzipCodec;
    use crate::db::testing::ScriptedDb;
    use tempfile::TempDir;

    fn test_setup(tmp: &TempDir, threshold: u64) -> (PipelineConfig, ConnectionSettings, GzipCodec)
    {
        let config = PipelineConfig::new(tmp.path()).with_chunk_threshold(threshold);
        (config, ConnectionSettings::default(), GzipCodec::new())
    }

    #[tokio::test]
    async fn test_small_unit_keeps_base_name() {
        let tmp = TempDir::new().unwrap();
        let (config, settings, codec) = test_setup(&tmp, 1024);
        let db = ScriptedDb::new(&[("users", "CREATE TABLE u (id INT);\n")]);

        let pipeline = ExportPipeline::new(&config, &settings, &db, &codec);
        let artifacts = pipeline.run(None).await.unwrap();

        assert_eq!(artifacts, vec![tmp.path().join("users.sql.gz")]);
        // The raw dump was consumed by compression; no part files exist.
        assert!(!tmp.path().join("users.sql").exists());
        assert!(!tmp.path().join("users.sql.part000").exists());
    }

    #[tokio::test]
    async fn test_oversized_unit_is_split_and_compressed() {
        let tmp = TempDir::new().unwrap();
        let (config, settings, codec) = test_setup(&tmp, 64);
        let payload = "INSERT INTO orders VALUES (1, 'x');\n".repeat(10);
        let db = ScriptedDb::new(&[("orders", &payload)]);

        let pipeline = ExportPipeline::new(&config, &settings, &db, &codec);
        let artifacts = pipeline.run(None).await.unwrap();

        assert!(artifacts.len() > 1);
        for (index, artifact) in artifacts.iter().enumerate() {
            let expected = tmp.path().join(format!("orders.sql.part{index:03}.gz"));
            assert_eq!(artifact, &expected);
            assert!(expected.exists());
        }
        // Neither the raw dump nor any uncompressed part survives.
        assert!(!tmp.path().join("orders.sql").exists());
        assert!(!tmp.path().join("orders.sql.part000").exists());
    }

    #[tokio::test]
    async fn test_prefix_filters_units() {
        let tmp = TempDir::new().unwrap();
        let (config, settings, codec) = test_setup(&tmp, 1024);
        let db = ScriptedDb::new(&[("shop_orders", "a\n"), ("shop_users", "b\n"), ("audit", "c\n")]);

        let pipeline = ExportPipeline::new(&config, &settings, &db, &codec);
        let artifacts = pipeline.run(Some("shop_")).await.unwrap();

        assert_eq!(artifacts.len(), 2);
        assert!(!tmp.path().join("audit.sql.gz").exists());
    }

    #[tokio::test]
    async fn test_empty_selection_is_refused() {
        let tmp = TempDir::new().unwrap();
        let (config, settings, codec) = test_setup(&tmp, 1024);
        let db = ScriptedDb::new(&[("users", "x\n")]);

        let pipeline = ExportPipeline::new(&config, &settings, &db, &codec);
        let result = pipeline.run(Some("zzz")).await;
        assert!(matches!(result, Err(SliceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failing_dump_aborts_the_batch() {
        let tmp = TempDir::new().unwrap();
        let (config, settings, codec) = test_setup(&tmp, 1024);
        let mut db = ScriptedDb::new(&[("orders", "a\n"), ("users", "b\n")]);
        db.fail_dump_of = Some("orders".to_string());

        let pipeline = ExportPipeline::new(&config, &settings, &db, &codec);
        let result = pipeline.run(None).await;

        assert!(matches!(result, Err(SliceError::Process { .. })));
        // "users" was queued after the failing unit and never processed.
        assert!(db.dumped.lock().unwrap().is_empty());
        assert!(!tmp.path().join("users.sql.gz").exists());
    }
}
