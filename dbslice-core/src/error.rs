/*!
Error types for the dbslice core pipeline.
*/

use thiserror::Error;

/// Result type used throughout the dbslice core.
pub type Result<T> = std::result::Result<T, SliceError>;

/// Errors that can occur during an export or import run.
#[derive(Error, Debug)]
pub enum SliceError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A dump, restore, or script subprocess exited unsuccessfully
    #[error("`{command}` exited with status code {code}")]
    Process { command: String, code: i32 },

    /// Corrupt or malformed compressed input
    #[error("Codec error: {0}")]
    Codec(String),

    /// Missing or unreadable connection settings
    #[error("Config error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The splitter produced more parts than the fixed-width index can order
    #[error("split produced {parts} parts, but zero-padded names only order up to {max}")]
    PartIndexOverflow { parts: usize, max: usize },
}

impl SliceError {
    /// Create a new process error from a subprocess exit status
    pub fn process<S: Into<String>>(command: S, status: std::process::ExitStatus) -> Self {
        Self::Process {
            command: command.into(),
            code: status.code().unwrap_or(-1),
        }
    }

    /// Create a new codec error
    pub fn codec<S: Into<String>>(msg: S) -> Self {
        Self::Codec(msg.into())
    }

    /// Create a new config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}
