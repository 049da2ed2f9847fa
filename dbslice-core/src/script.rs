//! Restore-script generation.
//!
//! Both platforms fail fast: the shell form aborts via `set -e`, the batch
//! form checks each command's errorlevel explicitly.

use crate::settings::ConnectionSettings;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Target scripting platform for the generated restore script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPlatform {
    /// POSIX shell: `import_databases.sh`, LF endings, executable bit set.
    Sh,
    /// Windows batch: `import_databases.bat`, CRLF endings.
    Bat,
}

impl ScriptPlatform {
    /// Platform of the current host.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Bat
        } else {
            Self::Sh
        }
    }

    pub fn script_name(self) -> &'static str {
        match self {
            Self::Sh => "import_databases.sh",
            Self::Bat => "import_databases.bat",
        }
    }

    fn line_ending(self) -> &'static str {
        match self {
            Self::Sh => "\n",
            Self::Bat => "\r\n",
        }
    }
}

/// One restore invocation feeding `artifact` to the restore utility.
pub fn restore_command(settings: &ConnectionSettings, artifact: &Path) -> String {
    let path = artifact.to_string_lossy().replace('\\', "/");
    format!(
        "mysql --default-character-set=utf8mb4 --binary-mode -h {} -u {} -p\"{}\" < \"{}\"",
        settings.host, settings.user, settings.password, path
    )
}

/// Assemble and write the restore script for `artifacts`, in order,
/// returning the script path.
pub fn write_script(
    dir: &Path,
    platform: ScriptPlatform,
    settings: &ConnectionSettings,
    artifacts: &[PathBuf],
) -> Result<PathBuf> {
    let mut lines: Vec<String> = match platform {
        ScriptPlatform::Sh => vec!["#!/bin/bash".to_string(), "set -e".to_string()],
        ScriptPlatform::Bat => vec!["@echo off".to_string()],
    };

    for artifact in artifacts {
        lines.push(restore_command(settings, artifact));
        if platform == ScriptPlatform::Bat {
            lines.push("if errorlevel 1 exit /b 1".to_string());
        }
    }

    let path = dir.join(platform.script_name());
    let mut body = lines.join(platform.line_ending());
    body.push_str(platform.line_ending());
    fs::write(&path, body)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if platform == ScriptPlatform::Sh {
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
    }

    info!(
        "wrote restore script {} ({} commands)",
        path.display(),
        artifacts.len()
    );
    Ok(path)
}
