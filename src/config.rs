//! Configuration for ferrokv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FerroError, Result};

/// Main configuration for a ferrokv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── appendonly.aof   (append-only command log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Append Log Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the append log
    pub log_sync_strategy: LogSyncStrategy,

    /// Drop an incomplete trailing frame on replay instead of failing startup
    pub truncate_partial_tail: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Append log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync inside every append (safest, slowest)
    EveryWrite,

    /// fsync from a background thread on a fixed interval
    Periodic { interval: Duration },

    /// Never fsync explicitly; leave it to the OS
    OsManaged,
}

impl LogSyncStrategy {
    /// One-second background sync
    pub const EVERY_SECOND: LogSyncStrategy = LogSyncStrategy::Periodic {
        interval: Duration::from_secs(1),
    };
}

impl Default for LogSyncStrategy {
    fn default() -> Self {
        Self::EVERY_SECOND
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./ferrokv_data"),
            log_sync_strategy: LogSyncStrategy::default(),
            truncate_partial_tail: true,
            listen_addr: "127.0.0.1:6379".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// File name of the append log inside `data_dir`
    pub const LOG_FILENAME: &'static str = "appendonly.aof";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the append log
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILENAME)
    }

    /// Reject settings the engine or server cannot run with
    pub fn validate(&self) -> Result<()> {
        if let LogSyncStrategy::Periodic { interval } = self.log_sync_strategy {
            if interval.is_zero() {
                return Err(FerroError::Config(
                    "periodic sync interval must be non-zero".to_string(),
                ));
            }
        }
        if self.max_connections == 0 {
            return Err(FerroError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the append log sync strategy
    pub fn log_sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.log_sync_strategy = strategy;
        self
    }

    /// Whether replay may cut off a torn final frame
    pub fn truncate_partial_tail(mut self, enabled: bool) -> Self {
        self.config.truncate_partial_tail = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
