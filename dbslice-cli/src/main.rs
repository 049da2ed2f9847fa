/*!
dbslice CLI - chunked database snapshot export and import.

`export` dumps, splits and compresses databases into the backup directory;
`import` reconstructs the artifacts found there and replays them through
the restore utility; `list` shows what the backup directory holds.
*/

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use dbslice_core::{
    grouping, BackupDir, ConnectionSettings, ExportPipeline, GzipCodec, ImportPipeline, MysqlCli,
    PipelineConfig,
};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Parser)]
#[command(name = "dbslice")]
#[command(about = "Chunked database snapshot export/import pipeline")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the durable compressed artifacts
    #[arg(short, long, global = true, default_value = "./databases")]
    backup_dir: PathBuf,

    /// Connection settings file (created with placeholders when missing)
    #[arg(short, long, global = true, default_value = "./connect.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump, split and compress databases into the backup directory
    Export {
        /// Only export databases whose name starts with this prefix
        prefix: Option<String>,

        /// Split threshold in bytes for raw dumps
        #[arg(long, default_value_t = dbslice_core::DEFAULT_CHUNK_THRESHOLD)]
        chunk_threshold: u64,
    },
    /// Reconstruct the compressed artifacts and replay them
    Import {
        /// Only import artifacts whose name starts with this prefix
        prefix: Option<String>,
    },
    /// List the durable artifacts in the backup directory
    List,
}

#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Export {
            prefix,
            chunk_threshold,
        } => {
            let config =
                PipelineConfig::new(&cli.backup_dir).with_chunk_threshold(chunk_threshold);
            let settings = ConnectionSettings::load_or_init(&cli.settings)?;
            let db = MysqlCli::new();
            let codec = GzipCodec::new();

            let artifacts = ExportPipeline::new(&config, &settings, &db, &codec)
                .run(prefix.as_deref())
                .await
                .context("export run failed")?;
            println!("Exported {} artifact(s)", artifacts.len());
        }
        Commands::Import { prefix } => {
            let config = PipelineConfig::new(&cli.backup_dir);
            let settings = ConnectionSettings::load_or_init(&cli.settings)?;
            let db = MysqlCli::new();
            let codec = GzipCodec::new();

            let report = ImportPipeline::new(&config, &settings, &db, &codec)
                .run(prefix.as_deref())
                .await
                .context("import run failed")?;
            if report.restored() == 0 {
                println!("No artifacts found in {}", cli.backup_dir.display());
            } else {
                println!(
                    "Restored {} single dump(s) and {} split dump(s)",
                    report.singles, report.groups
                );
            }
        }
        Commands::List => list_artifacts(&cli.backup_dir)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn list_artifacts(backup_dir: &PathBuf) -> Result<(), anyhow::Error> {
    let dir = BackupDir::new(backup_dir);
    let names = dir.list_compressed(None)?;
    if names.is_empty() {
        println!("No artifacts found in {}", backup_dir.display());
        return Ok(());
    }
    info!("listing {} artifact(s)", names.len());

    let mut rows = Vec::new();
    for name in &names {
        let kind = match grouping::part_base(name) {
            Some(base) => format!("part of {base}"),
            None => "single".to_string(),
        };
        let meta = std::fs::metadata(dir.join(name))?;
        rows.push(ArtifactRow {
            name: name.clone(),
            kind,
            size: format_size(meta.len()),
            modified: meta
                .modified()
                .map(format_timestamp)
                .unwrap_or_else(|_| "Unknown".to_string()),
        });
    }

    let table = Table::new(rows);
    println!("{table}");
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_timestamp(time: std::time::SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}
