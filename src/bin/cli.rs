//! SegKV CLI
//!
//! Command-line interface operating directly on a storage root.
//! Buffered writes are flushed when the command finishes.

use clap::{Parser, Subcommand};
use segkv::storage::read_entries;
use segkv::{Config, StorageEngine, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// SegKV CLI
#[derive(Parser, Debug)]
#[command(name = "segkv")]
#[command(about = "CLI for the SegKV log-structured key-value store")]
#[command(version)]
struct Args {
    /// Storage root directory
    #[arg(short, long, default_value = "./segkv_data")]
    root: String,

    /// Buffered writes before a flush
    #[arg(short, long, default_value = "100")]
    max_buffer_length: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair (value parsed as JSON, else taken as a string)
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    #[command(alias = "del")]
    Delete {
        /// The key to delete
        key: String,
    },

    /// Check whether a key holds a value
    Exists {
        /// The key to check
        key: String,
    },

    /// Set a key only if it currently holds the expected value
    Cas {
        /// The key to update
        key: String,

        /// Expected current value ("null" matches a missing key)
        expected: String,

        /// The new value
        value: String,
    },

    /// Flush buffered writes to a new segment
    Flush,

    /// Delete the storage root
    Clear,

    /// List segment files, newest first
    Segments,
}

/// Used when `RUST_LOG` is unset or invalid; logs go to stderr
const DEFAULT_LOG_FILTER: &str = "info,segkv=debug";

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> segkv::Result<()> {
    let config = Config::builder()
        .storage_root(&args.root)
        .max_buffer_length(args.max_buffer_length)
        .build();

    let engine = StorageEngine::open(config)?;

    match args.command {
        Commands::Get { key } => match engine.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            engine.set(key, parse_value(&value))?;
            println!("OK");
        }
        Commands::Delete { key } => {
            println!("{}", engine.delete(&key)?);
        }
        Commands::Exists { key } => {
            println!("{}", engine.exists(&key)?);
        }
        Commands::Cas {
            key,
            expected,
            value,
        } => {
            let expected = parse_value(&expected);
            println!(
                "{}",
                engine.check_and_set(&key, Some(&expected), parse_value(&value))?
            );
        }
        Commands::Flush => {
            engine.flush()?;
            println!("OK");
        }
        Commands::Clear => {
            engine.clear()?;
            println!("OK");
            return Ok(());
        }
        Commands::Segments => {
            let store = segkv::storage::SegmentStore::new(engine.segments_dir());
            for handle in store.list_segments_newest_first()? {
                let entries = read_entries(&handle.path)?;
                println!("{}\t{} entries", handle.file_name(), entries.len());
            }
        }
    }

    engine.close()
}

/// Interpret CLI input as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
