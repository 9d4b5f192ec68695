//! Periodic log flusher
//!
//! Background thread that syncs the append log on a fixed interval until
//! it is stopped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::error::Result;
use super::AppendLog;

/// Handle to the background sync thread
///
/// Stopping is explicit through [`LogFlusher::stop`]; dropping the handle
/// stops the thread too.
pub struct LogFlusher {
    /// Dropping the sender wakes the thread and ends its loop
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl LogFlusher {
    /// Start syncing `log` every `interval`
    pub fn spawn(log: Arc<AppendLog>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("ferrokv-aof-flush".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        // A failed sync is retried on the next tick
                        if let Err(e) = log.sync() {
                            tracing::warn!("Append log sync failed: {}", e);
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::debug!("Append log flusher started (interval {:?})", interval);

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop_tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Append log flusher panicked");
            } else {
                tracing::debug!("Append log flusher stopped");
            }
        }
    }
}

impl Drop for LogFlusher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
