/*!
Streaming compression adapters for backup artifacts.

The default implementation uses gzip. Both directions run as `io::copy`
pipelines over buffered readers and writers, so memory stays bounded
regardless of artifact size.
*/

use crate::{Result, SliceError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to compressed artifacts (without the dot).
pub const COMPRESSED_SUFFIX: &str = "gz";

/// Compression abstraction over on-disk artifacts.
///
/// This trait defines the interface for all codec implementations so the
/// pipelines can work with different algorithms without being coupled to
/// any specific one.
pub trait ArtifactCodec {
    /// Compress `path` into `<path>.<suffix>` and return the new path.
    /// The uncompressed input is deleted on success; the compressed form
    /// is the durable artifact.
    fn compress_path(&self, path: &Path) -> Result<PathBuf>;

    /// Decompress `path` (which must carry the codec suffix) and return the
    /// decompressed path. The compressed input is left intact and may be
    /// decompressed again.
    fn decompress_path(&self, path: &Path) -> Result<PathBuf>;

    /// Suffix carried by compressed artifacts (without the dot).
    fn suffix(&self) -> &str;

    /// Get the name of the compression algorithm
    fn algorithm_name(&self) -> &str;
}

/// Gzip codec backed by flate2's streaming encoder and decoder.
#[derive(Debug, Clone)]
pub struct GzipCodec {
    compression_level: Compression,
}

impl GzipCodec {
    /// Create a new gzip codec with the default compression level (6)
    pub fn new() -> Self {
        Self {
            compression_level: Compression::default(),
        }
    }

    /// Create a new gzip codec with the specified compression level (0-9)
    pub fn with_level(level: u32) -> Self {
        Self {
            compression_level: Compression::new(level),
        }
    }

    /// Create a codec for fast compression (level 1)
    pub fn fast() -> Self {
        Self::with_level(1)
    }

    /// Create a codec for maximum compression (level 9)
    pub fn max() -> Self {
        Self::with_level(9)
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCodec for GzipCodec {
    fn compress_path(&self, path: &Path) -> Result<PathBuf> {
        let compressed = compressed_path_for(path);

        let mut input = BufReader::new(File::open(path)?);
        let output = BufWriter::new(File::create(&compressed)?);
        let mut encoder = GzEncoder::new(output, self.compression_level);
        io::copy(&mut input, &mut encoder)?;
        let writer = encoder.finish()?;
        writer.into_inner().map_err(|e| e.into_error())?;

        fs::remove_file(path)?;
        debug!("compressed {} -> {}", path.display(), compressed.display());
        Ok(compressed)
    }

    fn decompress_path(&self, path: &Path) -> Result<PathBuf> {
        let decompressed = decompressed_path_for(path)?;

        let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
        let mut output = BufWriter::new(File::create(&decompressed)?);
        if let Err(e) = io::copy(&mut decoder, &mut output) {
            // Do not leave a partial artifact behind.
            drop(output);
            let _ = fs::remove_file(&decompressed);
            return Err(match e.kind() {
                ErrorKind::InvalidInput | ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
                    SliceError::codec(format!("corrupt gzip stream in {}: {e}", path.display()))
                }
                _ => SliceError::Io(e),
            });
        }
        output.into_inner().map_err(|e| e.into_error())?;

        debug!(
            "decompressed {} -> {}",
            path.display(),
            decompressed.display()
        );
        Ok(decompressed)
    }

    fn suffix(&self) -> &str {
        COMPRESSED_SUFFIX
    }

    fn algorithm_name(&self) -> &str {
        "gzip"
    }
}

/// `path` with the compressed suffix appended.
pub fn compressed_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// `path` with the compressed suffix stripped.
fn decompressed_path_for(path: &Path) -> Result<PathBuf> {
    let name = path.to_string_lossy();
    name.strip_suffix(&format!(".{COMPRESSED_SUFFIX}"))
        .map(PathBuf::from)
        .ok_or_else(|| {
            SliceError::validation(format!(
                "{} does not carry the .{COMPRESSED_SUFFIX} suffix",
                path.display()
            ))
        })
}
