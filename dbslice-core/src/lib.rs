/*!
# dbslice core

Chunked database-snapshot export/import pipeline.

The export side dumps each logical database to text through the external
dump utility, splits oversized dumps into bounded, ordered parts, and
compresses every part into the durable artifact set. The import side
regroups the discovered artifacts by filename, reconstructs split dumps in
part order, and replays everything through a generated restore script,
deleting its intermediates on the way out.

## Architecture

The pipelines are orchestration only; the moving pieces sit behind seams:

- [`DatabaseClient`] is the port to the external dump/restore utilities
- [`ArtifactCodec`] is the port to the streaming compression codec
- [`PipelineConfig`] and [`ConnectionSettings`] are explicit values passed
  into each entry point; there is no shared mutable configuration

## Usage

```rust,no_run
use dbslice_core::{
    ConnectionSettings, ExportPipeline, GzipCodec, ImportPipeline, MysqlCli, PipelineConfig,
};

# async fn run() -> dbslice_core::Result<()> {
let config = PipelineConfig::new("./databases");
let settings = ConnectionSettings::load_or_init("./connect.json".as_ref())?;
let db = MysqlCli::new();
let codec = GzipCodec::new();

// Export every database, or only those matching a prefix.
let artifacts = ExportPipeline::new(&config, &settings, &db, &codec)
    .run(None)
    .await?;

// Later, on the receiving side:
let report = ImportPipeline::new(&config, &settings, &db, &codec)
    .run(None)
    .await?;
# Ok(())
# }
```
*/

pub mod backup_dir;
pub mod codec;
pub mod db;
pub mod error;
pub mod export;
pub mod grouping;
pub mod import;
pub mod merge;
pub mod script;
pub mod settings;
pub mod split;
pub mod temp;

pub use backup_dir::BackupDir;
pub use codec::{ArtifactCodec, GzipCodec, COMPRESSED_SUFFIX};
pub use db::{DatabaseClient, MysqlCli};
pub use error::{Result, SliceError};
pub use export::{ExportPipeline, DUMP_SUFFIX};
pub use grouping::{group_artifacts, PartGroups};
pub use import::{ImportPipeline, ImportReport};
pub use merge::{merge_group, MERGED_SUFFIX};
pub use script::{restore_command, write_script, ScriptPlatform};
pub use settings::{ConnectionSettings, PipelineConfig, DEFAULT_CHUNK_THRESHOLD};
pub use split::{part_file_path, split_by_lines, SplitOutcome, MAX_PARTS, PART_INDEX_WIDTH};
pub use temp::TempFileSet;
