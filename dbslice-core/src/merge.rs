//! Reconstruction of split dumps from ordered part groups.

use crate::codec::ArtifactCodec;
use crate::temp::TempFileSet;
use crate::Result;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix given to reconstructed artifacts: `<base>.merged.sql`.
pub const MERGED_SUFFIX: &str = ".merged.sql";

/// Decompress `parts` in the given order and concatenate them into
/// `<base>.merged.sql` inside `dir`, one newline after each part.
///
/// Each decompressed part is stream-copied into the merged writer, so
/// memory stays bounded regardless of part size. Every decompressed part
/// and the merged artifact itself are registered in `temps`; all of them
/// are intermediates owned by the import run.
pub fn merge_group<C: ArtifactCodec>(
    dir: &Path,
    base: &str,
    parts: &[String],
    codec: &C,
    temps: &mut TempFileSet,
) -> Result<PathBuf> {
    let merged_path = dir.join(format!("{base}{MERGED_SUFFIX}"));
    let mut merged = BufWriter::new(File::create(&merged_path)?);
    temps.register(&merged_path);

    for part in parts {
        let decompressed = codec.decompress_path(&dir.join(part))?;
        temps.register(&decompressed);

        let mut reader = BufReader::new(File::open(&decompressed)?);
        io::copy(&mut reader, &mut merged)?;
        merged.write_all(b"\n")?;
    }

    merged.into_inner().map_err(|e| e.into_error())?;
    info!(
        "reconstructed {} from {} parts",
        merged_path.display(),
        parts.len()
    );
    Ok(merged_path)
}
