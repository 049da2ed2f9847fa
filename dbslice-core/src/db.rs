/*!
Seam to the external database utilities.

The pipelines never talk wire protocol; everything goes through the dump
and restore command-line tools. This module defines the port and the
production adapter around the MySQL binaries, leaving tests free to
substitute scripted fakes.
*/

use crate::settings::ConnectionSettings;
use crate::{Result, SliceError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Schemas that belong to the server rather than the data; never exported.
const SYSTEM_SCHEMAS: &[&str] = &[
    "mysql",
    "information_schema",
    "performance_schema",
    "sys",
    "phpmyadmin",
];

/// External database operations the pipelines depend on.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Names of the logical databases available for export.
    async fn list_units(&self, settings: &ConnectionSettings) -> Result<Vec<String>>;

    /// Dump one unit's contents as text into `dest`. A non-zero utility
    /// exit is a process error; the caller treats it as fatal for the run.
    async fn dump_unit(
        &self,
        settings: &ConnectionSettings,
        unit: &str,
        dest: &Path,
    ) -> Result<()>;

    /// Execute a single SQL statement against the server.
    async fn execute_sql(&self, settings: &ConnectionSettings, statement: &str) -> Result<()>;
}

/// `DatabaseClient` backed by the `mysql` and `mysqldump` binaries.
#[derive(Debug, Clone, Default)]
pub struct MysqlCli;

impl MysqlCli {
    pub fn new() -> Self {
        Self
    }

    fn connection_args(settings: &ConnectionSettings) -> Vec<String> {
        vec![
            "-h".to_string(),
            settings.host.clone(),
            "-u".to_string(),
            settings.user.clone(),
            format!("--password={}", settings.password),
        ]
    }
}

#[async_trait]
impl DatabaseClient for MysqlCli {
    async fn list_units(&self, settings: &ConnectionSettings) -> Result<Vec<String>> {
        let excluded = SYSTEM_SCHEMAS
            .iter()
            .map(|s| format!("'{s}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT SCHEMA_NAME FROM information_schema.schemata \
             WHERE SCHEMA_NAME NOT IN ({excluded})"
        );

        let output = Command::new("mysql")
            .args(Self::connection_args(settings))
            .args(["-N", "-B", "-e", &query])
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(SliceError::process("mysql", output.status));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn dump_unit(
        &self,
        settings: &ConnectionSettings,
        unit: &str,
        dest: &Path,
    ) -> Result<()> {
        let out_file = std::fs::File::create(dest)?;
        info!("dumping {unit} to {}", dest.display());

        let status = Command::new("mysqldump")
            .arg("--no-defaults")
            .args(Self::connection_args(settings))
            .args(["--databases", unit, "--add-drop-database"])
            .stdin(Stdio::null())
            .stdout(Stdio::from(out_file))
            .status()
            .await?;
        if !status.success() {
            return Err(SliceError::process(format!("mysqldump {unit}"), status));
        }
        Ok(())
    }

    async fn execute_sql(&self, settings: &ConnectionSettings, statement: &str) -> Result<()> {
        debug!("executing: {statement}");
        let status = Command::new("mysql")
            .args(Self::connection_args(settings))
            .args(["--default-character-set=utf8mb4", "-e", statement])
            .stdin(Stdio::null())
            .status()
            .await?;
        if !status.success() {
            return Err(SliceError::process("mysql -e", status));
        }
        Ok(())
    }
}
