//! PhoneBook Server Binary
//!
//! Opens the data file and starts the TCP server.

use std::sync::Arc;

use clap::Parser;
use phonebook::network::Server;
use phonebook::{Config, PhoneBook, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// PhoneBook Server
#[derive(Parser, Debug)]
#[command(name = "phonebook-server")]
#[command(about = "Persistent phone book served over TCP")]
#[command(version)]
struct Args {
    /// Data file
    #[arg(short, long, default_value = "./phonebook.db")]
    data_file: String,

    /// Keyspace holding the records
    #[arg(short, long, default_value = "phoneBook")]
    keyspace: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Sync the data file every N writes instead of every write.
    ///
    /// The server has no signal handling, so stopping it with Ctrl+C or a
    /// kill skips the final sync: up to N-1 acknowledged writes can be lost
    /// if the machine goes down before the OS flushes them.
    #[arg(long)]
    sync_every: Option<usize>,

    /// Stale log entries tolerated before compaction (0 disables)
    #[arg(long, default_value = "4096")]
    compaction_threshold: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,phonebook=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("PhoneBook Server v{}", phonebook::VERSION);
    tracing::info!("Data file: {}", args.data_file);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        Some(count) => SyncStrategy::EveryNEntries { count },
        None => SyncStrategy::EveryWrite,
    };

    let config = Config::builder()
        .data_file(&args.data_file)
        .keyspace(&args.keyspace)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .sync_strategy(sync_strategy)
        .compaction_threshold(args.compaction_threshold)
        .build();

    let store = match PhoneBook::open(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open phone book: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, Arc::clone(&store)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
    drop(server);

    match Arc::try_unwrap(store) {
        Ok(store) => {
            if let Err(e) = store.close() {
                tracing::error!("Failed to close phone book: {}", e);
                std::process::exit(1);
            }
        }
        Err(_) => tracing::warn!("Phone book still shared at exit, relying on drop to flush"),
    }

    tracing::info!("Server stopped");
}
