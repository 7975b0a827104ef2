//! refluxdb CLI
//!
//! Command-line interface for refluxdb operations:
//! - Write line protocol from a file or stdin
//! - Run queries
//! - Decode a single line
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use refluxdb::config::{generate_default_config, Config, LoggingConfig};
use refluxdb::ingest::Ingestor;
use refluxdb::protocol;
use refluxdb::query::{QueryExecutor, QueryOutput};
use refluxdb::storage::open_store;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "refluxdb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Line protocol ingest and InfluxQL-style queries over a local point store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write line protocol into the store
    Write {
        /// Input file, `-` for stdin
        #[arg(default_value = "-")]
        file: String,
    },

    /// Run a query
    Query {
        /// Query text, e.g. "SELECT mean(value) FROM cpu GROUP BY time(1m)"
        query: String,
        /// Line protocol file to ingest before querying
        #[arg(short, long)]
        load: Option<PathBuf>,
    },

    /// Decode one line and print the record
    Decode {
        /// Line protocol text
        line: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Write { file } => {
            let body = read_input(&file)?;
            let store = open_store(&config.storage)?;
            let ingestor = Ingestor::new(store, config.ingest.batch_policy);

            let report = ingestor.ingest(&body).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Wrote {} points from {} lines",
                    report.points_written, report.lines
                );
                for rejected in &report.rejected {
                    println!(
                        "  rejected line {}: {}",
                        rejected.line_number, rejected.error
                    );
                }
            }
        }

        Commands::Query { query, load } => {
            let store = open_store(&config.storage)?;

            if let Some(path) = load {
                let body = read_input(&path.to_string_lossy())?;
                let ingestor = Ingestor::new(store.clone(), config.ingest.batch_policy);
                let report = ingestor.ingest(&body).await?;
                tracing::info!("Loaded {} points from {:?}", report.points_written, path);
            }

            let executor = QueryExecutor::new(store, config.query.default_database.clone());
            let output = executor.execute_str(&query).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_table(&output);
            }
        }

        Commands::Decode { line } => {
            let record = protocol::decode(&line)?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("measurement: {}", record.measurement);
                for (key, value) in record.tags() {
                    println!("tag        {}={}", key, value);
                }
                for (key, value) in record.fields() {
                    println!("field      {}={} ({})", key, value, value.type_name());
                }
                println!("timestamp: {}", record.timestamp);
                println!("encoded:   {}", protocol::encode(&record));
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing config to {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays parseable
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("refluxdb={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_input(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("reading stdin")?;
        Ok(body)
    } else {
        std::fs::read_to_string(Path::new(file)).with_context(|| format!("reading {}", file))
    }
}

fn print_table(output: &QueryOutput) {
    match output {
        QueryOutput::Databases { names } | QueryOutput::Measurements { names } => {
            println!("name");
            println!("----");
            for name in names {
                println!("{}", name);
            }
        }
        QueryOutput::Acknowledged { database } => println!("OK ({})", database),
        QueryOutput::Rows {
            measurement, rows, ..
        } => {
            println!("name: {}", measurement);
            println!("{:<20} {:<16} {}", "time", "label", "value");
            for row in rows {
                println!("{:<20} {:<16} {}", row.timestamp, row.label, row.value);
            }
        }
    }
}
