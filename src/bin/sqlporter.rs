//! sqlporter — dump, seed and wipe SQL databases from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Dump a database as SQL text
//! sqlporter export --database-url sqlite://app.db > dump.sql
//!
//! # Dump as a JSON document, structure only
//! sqlporter export --format json --structure-only -o schema.json
//!
//! # Seed a database from a dump (format detected by extension)
//! sqlporter import dump.sql
//! sqlporter import data.json --batch-size 500
//!
//! # Show the statements a dump would execute
//! sqlporter inspect dump.sql
//! ```

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Deserialize;
use sqlporter::prelude::*;

#[derive(Parser)]
#[command(name = "sqlporter")]
#[command(version)]
#[command(about = "Import, export and wipe SQL databases", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlporter export --database-url sqlite://app.db -o dump.sql
    sqlporter export --format json --tables Artist,Album
    sqlporter import dump.sql
    sqlporter wipe --database-url sqlite://app.db")]
struct Cli {
    /// Database connection URL (postgres://, mysql://, sqlite://)
    #[arg(long, env = "SQLPORTER_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum DumpFormat {
    Sql,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the database as a SQL dump or a JSON document
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "sql")]
        format: DumpFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export structure without rows
        #[arg(long)]
        structure_only: bool,

        /// Export rows without structure
        #[arg(long)]
        data_only: bool,

        /// Restrict to the named tables
        #[arg(short, long, value_delimiter = ',')]
        tables: Vec<String>,
    },

    /// Apply a SQL dump or a JSON document to the database
    Import {
        /// Dump file (.sql or .json)
        file: PathBuf,

        /// Dump format; detected from the file extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<DumpFormat>,

        /// Rows per compiled INSERT statement
        #[arg(long, default_value_t = 250)]
        batch_size: usize,
    },

    /// Drop every non-reserved table, index, trigger and view
    Wipe {
        /// Restrict to the named tables
        #[arg(short, long, value_delimiter = ',')]
        tables: Vec<String>,
    },

    /// Print the statements of a dump file without executing them
    Inspect {
        /// Dump file (.sql or .json)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            format,
            ref output,
            structure_only,
            data_only,
            ref tables,
        } => {
            let mut backend = connect(&cli).await?;
            let opts = Options {
                structure_only,
                data_only,
                table_filter: filter(tables),
                ..Options::default()
            };
            let (text, count) = match format {
                DumpFormat::Sql => {
                    let export = sqlporter::export_sql(&mut backend, opts).await?;
                    (export.sql, export.count)
                }
                DumpFormat::Json => {
                    let export = sqlporter::export_json(&mut backend, opts).await?;
                    (export.document.to_json_pretty()?, export.count)
                }
            };
            match output {
                Some(path) => {
                    std::fs::write(path, &text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!(
                        "{} Wrote {} ({} statements)",
                        "✓".green(),
                        path.display().to_string().cyan(),
                        count
                    );
                }
                None => print!("{}", text),
            }
            if cli.verbose {
                eprintln!("{} {} statements exported", "✓".green(), count);
            }
        }

        Commands::Import {
            ref file,
            format,
            batch_size,
        } => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let format = format.unwrap_or_else(|| detect_format(file));
            let mut backend = connect(&cli).await?;
            let opts = Options {
                batch_insert_size: batch_size,
                progress: Some(progress_meter()),
                ..Options::default()
            };
            let count = match format {
                DumpFormat::Sql => sqlporter::import_sql(&mut backend, &text, opts).await?,
                DumpFormat::Json => sqlporter::import_json(&mut backend, &text, opts).await?,
            };
            eprintln!();
            println!("{} {} statements executed", "✓".green(), count);
        }

        Commands::Wipe { ref tables } => {
            let mut backend = connect(&cli).await?;
            let opts = Options {
                table_filter: filter(tables),
                progress: Some(progress_meter()),
                ..Options::default()
            };
            let count = sqlporter::wipe(&mut backend, opts).await?;
            eprintln!();
            println!("{} {} objects dropped", "✓".green(), count);
        }

        Commands::Inspect { ref file } => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            if detect_format(file) == DumpFormat::Json {
                let doc = Document::from_json(&text)?;
                let batch = compile(&doc, &Options::default());
                for stmt in &batch.main {
                    println!("{};", stmt);
                }
                for stmt in &batch.deferred {
                    println!("{}; {}", stmt, "-- deferred".dimmed());
                }
                println!();
                println!("{} statement(s)", batch.total().to_string().cyan());
            } else {
                let statements: Vec<String> = tokenize(&text).collect();
                for stmt in &statements {
                    println!("{};", stmt);
                }
                println!();
                println!("{} statement(s)", statements.len().to_string().cyan());
            }
        }
    }

    Ok(())
}

async fn connect(cli: &Cli) -> Result<SqlxBackend> {
    let url = cli
        .database_url
        .clone()
        .or_else(config_database_url)
        .context("no database URL; use --database-url, SQLPORTER_DATABASE_URL or config.toml")?;
    if cli.verbose {
        eprintln!("{} {}", "Connecting to:".dimmed(), url);
    }
    Ok(SqlxBackend::connect(&url).await?)
}

#[derive(Deserialize)]
struct Config {
    database_url: Option<String>,
}

/// `<config dir>/sqlporter/config.toml`, e.g. `~/.config/sqlporter/config.toml`.
fn config_database_url() -> Option<String> {
    let path = dirs::config_dir()?.join("sqlporter").join("config.toml");
    let text = std::fs::read_to_string(path).ok()?;
    let config: Config = toml::from_str(&text).ok()?;
    config.database_url
}

fn detect_format(path: &Path) -> DumpFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => DumpFormat::Json,
        _ => DumpFormat::Sql,
    }
}

fn filter(tables: &[String]) -> Option<Vec<String>> {
    if tables.is_empty() {
        None
    } else {
        Some(tables.to_vec())
    }
}

fn progress_meter() -> ProgressFn {
    Box::new(|current, total| {
        eprint!("\r{} {}/{} statements", "→".dimmed(), current, total);
        let _ = std::io::stderr().flush();
    })
}
