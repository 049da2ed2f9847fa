//! Byte-threshold splitting of raw dump artifacts into ordered parts.
//!
//! Lines stream through a single chunk buffer, so memory is bounded by the
//! threshold rather than the artifact size, and every part is written whole
//! in one filesystem write.

use crate::{Result, SliceError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed zero-padding width for part indices.
///
/// Lexical order of part filenames equals numeric order only while indices
/// stay below `10^PART_INDEX_WIDTH`; the splitter fails loudly at that
/// boundary instead of emitting a name that would sort out of place.
pub const PART_INDEX_WIDTH: usize = 3;

/// Highest part count whose padded names still sort lexically == numerically.
pub const MAX_PARTS: usize = 10usize.pow(PART_INDEX_WIDTH as u32);

/// Result of a split attempt.
#[derive(Debug, PartialEq)]
pub enum SplitOutcome {
    /// The artifact never reached the threshold and keeps its base name;
    /// no part files were created.
    Whole(PathBuf),
    /// Ordered part files. The caller decides when to delete the original.
    Parts(Vec<PathBuf>),
}

impl SplitOutcome {
    /// The files to hand to the compressor, in order.
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            SplitOutcome::Whole(path) => vec![path],
            SplitOutcome::Parts(paths) => paths,
        }
    }
}

/// Build the on-disk name for part `index` of `path`: `<path>.partNNN`.
pub fn part_file_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".part{:0width$}", index, width = PART_INDEX_WIDTH));
    PathBuf::from(name)
}

/// Split `path` into parts of roughly `threshold` encoded bytes.
///
/// Both `\n` and `\r\n` count as line boundaries. Each line adds its byte
/// length plus one newline byte to a running counter; once the counter
/// reaches the threshold the accumulated lines flush whole as the next
/// part (lines joined with `\n`, no trailing newline) and the counter
/// resets. Lines left over after the last flush become a final, possibly
/// smaller part. If the threshold is never reached the original file is
/// returned untouched.
pub fn split_by_lines(path: &Path, threshold: u64) -> Result<SplitOutcome> {
    let reader = BufReader::new(File::open(path)?);

    let mut parts: Vec<PathBuf> = Vec::new();
    let mut chunk = String::new();
    let mut chunk_lines: usize = 0;
    let mut size: u64 = 0;

    for line in reader.lines() {
        let line = line?;
        size += line.len() as u64 + 1;
        if chunk_lines > 0 {
            chunk.push('\n');
        }
        chunk.push_str(&line);
        chunk_lines += 1;

        if size >= threshold {
            flush_part(path, &mut parts, &chunk)?;
            chunk.clear();
            chunk_lines = 0;
            size = 0;
        }
    }

    if parts.is_empty() {
        debug!("{} stayed below the split threshold", path.display());
        return Ok(SplitOutcome::Whole(path.to_path_buf()));
    }

    if chunk_lines > 0 {
        flush_part(path, &mut parts, &chunk)?;
    }

    info!("split {} into {} parts", path.display(), parts.len());
    Ok(SplitOutcome::Parts(parts))
}

fn flush_part(base: &Path, parts: &mut Vec<PathBuf>, chunk: &str) -> Result<()> {
    let index = parts.len();
    if index >= MAX_PARTS {
        return Err(SliceError::PartIndexOverflow {
            parts: index + 1,
            max: MAX_PARTS,
        });
    }
    let part = part_file_path(base, index);
    fs::write(&part, chunk)?;
    parts.push(part);
    Ok(())
}
