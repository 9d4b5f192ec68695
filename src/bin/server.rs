//! ferrokv Server Binary
//!
//! Replays the append log and starts the TCP server.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use ferrokv::config::LogSyncStrategy;
use ferrokv::network::Server;
use ferrokv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// ferrokv Server
#[derive(Parser, Debug)]
#[command(name = "ferrokv-server")]
#[command(about = "In-memory key-value store with append-only log recovery")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./ferrokv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// When to fsync the append log
    #[arg(long, value_enum, default_value_t = Fsync::Everysec)]
    fsync: Fsync,

    /// Fail startup instead of truncating an incomplete final log entry
    #[arg(long)]
    no_truncate_tail: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fsync {
    /// After every write
    Always,
    /// Once per second from a background thread
    Everysec,
    /// Leave it to the OS
    No,
}

impl From<Fsync> for LogSyncStrategy {
    fn from(fsync: Fsync) -> Self {
        match fsync {
            Fsync::Always => LogSyncStrategy::EveryWrite,
            Fsync::Everysec => LogSyncStrategy::EVERY_SECOND,
            Fsync::No => LogSyncStrategy::OsManaged,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ferrokv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ferrokv server v{}", ferrokv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .log_sync_strategy(args.fsync.into())
        .truncate_partial_tail(!args.no_truncate_tail)
        .build();

    // Log open or replay failure is fatal
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
    }
    drop(server);

    // Connection threads may still hold the engine; sync whatever we can
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::error!("Failed to close engine: {}", e);
            }
        }
        Err(engine) => {
            if let Err(e) = engine.sync() {
                tracing::error!("Final append log sync failed: {}", e);
            }
        }
    }

    tracing::info!("Server stopped");
}
