//! Engine Module
//!
//! The core engine that coordinates all components.
//!
//! ## Responsibilities
//! - Replay the append log into a fresh store on startup
//! - Route requests through the command table
//! - Append mutating commands to the log before applying them
//! - Run and stop the periodic log flusher

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::aof::{AppendLog, LogFlusher, ReplayStats};
use crate::command::{dispatch, Command, CommandKind};
use crate::config::{Config, LogSyncStrategy};
use crate::error::Result;
use crate::protocol::{Request, Value};
use crate::store::Store;

/// The main engine
///
/// ## Concurrency Model
///
/// - **Reads** (`GET`, `HGET`, `HGETALL`, `PING`): go straight to the store,
///   which allows any number of concurrent readers per mapping.
///
/// - **Writes** (`SET`, `HSET`): serialized *per mapping* by a writer mutex
///   held across log append + store apply, so the log order matches the
///   apply order for conflicting writes. `SET` and `HSET` never wait on
///   each other here; they only meet briefly on the log file mutex.
///
/// ## Durability Ordering
///
/// A write is appended first and applied second. Arity is checked before
/// the append, and a checked command cannot fail to apply, so the only
/// crash window leaves the log *ahead* of memory: replay then applies a
/// write whose reply may never have reached the client.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// In-memory keyspace (internal RwLock per mapping)
    store: Store,

    /// Append-only command log (internal Mutex on the file)
    log: Arc<AppendLog>,

    /// Background sync thread, present for the periodic strategy
    flusher: Option<LogFlusher>,

    /// Serializes SET append+apply
    string_writes: Mutex<()>,

    /// Serializes HSET append+apply
    hash_writes: Mutex<()>,

    /// What startup replay found
    replay_stats: ReplayStats,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Open the append log
    /// 3. Replay every logged command into a fresh store
    /// 4. Start the flusher
    /// 5. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Open the log (fatal on failure)
        let log = Arc::new(AppendLog::open_with(
            &config.log_path(),
            config.log_sync_strategy,
        )?);

        // Step 3: Replay before anything else can touch the log
        let store = Store::new();
        let replay_stats = log.replay(config.truncate_partial_tail, |value| {
            let request = Request::from_value(value)?;
            let reply = dispatch(&store, request);
            if let Value::Error(message) = reply {
                tracing::warn!("Replayed command was rejected: {}", message);
            }
            Ok(())
        })?;

        tracing::info!(
            "Append log replay: {} commands, {} bytes, {} string keys, {} hashes",
            replay_stats.commands_replayed,
            replay_stats.bytes_replayed,
            store.string_count(),
            store.hash_count()
        );

        // Step 4: Background sync only once replay is done
        let flusher = match config.log_sync_strategy {
            LogSyncStrategy::Periodic { interval } => {
                Some(LogFlusher::spawn(Arc::clone(&log), interval)?)
            }
            LogSyncStrategy::EveryWrite | LogSyncStrategy::OsManaged => None,
        };

        Ok(Self {
            config,
            store,
            log,
            flusher,
            string_writes: Mutex::new(()),
            hash_writes: Mutex::new(()),
            replay_stats,
        })
    }

    /// Execute a request
    ///
    /// Unknown commands and arity errors come back as `Ok(Value::Error)`.
    /// `Err` means the log append failed; the store is left untouched.
    pub fn execute(&self, request: Request) -> Result<Value> {
        let command = match Command::parse(request) {
            Ok(command) => command,
            Err(err) => return Ok(err.into()),
        };

        if !command.is_write() {
            return Ok(command.execute(&self.store));
        }

        let _write_guard = self.writer_lock(command.kind()).lock();
        self.log.append_value(&command.to_value())?;
        Ok(command.execute(&self.store))
    }

    fn writer_lock(&self, kind: CommandKind) -> &Mutex<()> {
        match kind {
            CommandKind::HSet => &self.hash_writes,
            _ => &self.string_writes,
        }
    }

    /// Force the log onto stable storage now
    pub fn sync(&self) -> Result<()> {
        self.log.sync()
    }

    /// Close the engine gracefully
    ///
    /// Stops the flusher, then syncs whatever it had not yet synced.
    pub fn close(mut self) -> Result<()> {
        if let Some(flusher) = self.flusher.take() {
            flusher.stop();
        }
        self.log.sync()?;
        tracing::debug!("Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the in-memory store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get the append log
    pub fn log(&self) -> &AppendLog {
        &self.log
    }

    /// Get what startup replay found
    pub fn replay_stats(&self) -> &ReplayStats {
        &self.replay_stats
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }
}
