//! Append log file
//!
//! Owns the log file handle. Append, sync and replay all go through one
//! mutex because they share the file cursor.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::LogSyncStrategy;
use crate::error::{FerroError, Result};
use crate::protocol::{encode_value, read_value, Value};
use super::replay::{PositionReader, ReplayStats};

/// Append-only command log
pub struct AppendLog {
    path: PathBuf,

    /// Opened read + append; every write lands at the end of the file
    file: Mutex<File>,

    /// fsync inside `append` (the `EveryWrite` strategy)
    sync_on_append: bool,

    /// Completed syncs, for observability and tests
    sync_count: AtomicU64,

    /// Set when a failed append could not be rolled back; the file may end
    /// in a partial command, so further appends are refused
    poisoned: AtomicBool,
}

impl AppendLog {
    /// Open or create a log file, leaving syncing to the caller
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, LogSyncStrategy::OsManaged)
    }

    /// Open or create a log file with a sync strategy
    ///
    /// Only `EveryWrite` changes the behaviour of the log itself; the
    /// periodic strategy is driven from outside by a [`super::LogFlusher`].
    pub fn open_with(path: &Path, strategy: LogSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        tracing::debug!("Opened append log {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            sync_on_append: strategy == LogSyncStrategy::EveryWrite,
            sync_count: AtomicU64::new(0),
            poisoned: AtomicBool::new(false),
        })
    }

    /// Append already-encoded command bytes to the end of the log
    ///
    /// On failure the file is cut back to its previous length, so the log
    /// always ends on a command boundary.
    pub fn append(&self, bytes: &[u8]) -> Result<()> {
        if self.poisoned.load(Ordering::Acquire) {
            return Err(FerroError::Io(io::Error::new(
                ErrorKind::Other,
                "append log is unusable after a failed rollback",
            )));
        }

        let mut file = self.file.lock();
        write_or_rollback(&mut *file, bytes, self.sync_on_append, &self.poisoned)?;

        if self.sync_on_append {
            self.sync_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Encode a value and append it
    pub fn append_value(&self, value: &Value) -> Result<()> {
        self.append(&encode_value(value))
    }

    /// Force everything appended so far onto stable storage
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_data()?;
        self.sync_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Decode every recorded value from the start, in append order
    ///
    /// The callback's error aborts replay and is reported with the offset
    /// of the offending frame. An incomplete final frame is cut off when
    /// `truncate_partial_tail` is set and is an error otherwise; any other
    /// malformed content is always an error.
    pub fn replay<F>(&self, truncate_partial_tail: bool, mut callback: F) -> Result<ReplayStats>
    where
        F: FnMut(Value) -> Result<()>,
    {
        let mut file = self.file.lock();
        let file_len = file.metadata()?.len();
        file.seek(SeekFrom::Start(0))?;

        let mut stats = ReplayStats::default();
        let mut torn_at = None;
        {
            let mut reader = PositionReader::new(BufReader::new(&mut *file));

            loop {
                let offset = reader.position();
                match read_value(&mut reader) {
                    Ok(Some(value)) => {
                        callback(value).map_err(|e| FerroError::LogReplay {
                            offset,
                            reason: e.to_string(),
                        })?;
                        stats.commands_replayed += 1;
                    }
                    Ok(None) => break,
                    Err(e) if e.is_unexpected_eof() => {
                        if !truncate_partial_tail {
                            return Err(FerroError::LogReplay {
                                offset,
                                reason: "incomplete command at end of log".to_string(),
                            });
                        }
                        torn_at = Some(offset);
                        break;
                    }
                    Err(FerroError::Io(e)) => return Err(FerroError::Io(e)),
                    Err(e) => {
                        return Err(FerroError::LogReplay {
                            offset,
                            reason: e.to_string(),
                        })
                    }
                }
                stats.bytes_replayed = reader.position();
            }
        }

        if let Some(offset) = torn_at {
            file.set_len(offset)?;
            file.sync_all()?;
            stats.truncated_bytes = file_len - offset;
            tracing::warn!(
                "Append log {} had an incomplete final command; truncated {} bytes at offset {}",
                self.path.display(),
                stats.truncated_bytes,
                offset
            );
        }

        Ok(stats)
    }

    /// Current size of the log file in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of completed syncs since open
    pub fn sync_count(&self) -> u64 {
        self.sync_count.load(Ordering::Relaxed)
    }
}

/// File operations an append needs in order to undo itself
trait LogFile: Write {
    fn size(&mut self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Write (and optionally sync) `bytes`, restoring the previous length if
/// either step fails
fn write_or_rollback<F: LogFile>(
    file: &mut F,
    bytes: &[u8],
    sync: bool,
    poisoned: &AtomicBool,
) -> Result<()> {
    let prev_len = file.size()?;

    let mut written = file.write_all(bytes);
    if written.is_ok() && sync {
        written = file.sync();
    }

    if let Err(e) = written {
        match file.truncate_to(prev_len) {
            Ok(()) => tracing::warn!(
                "Append failed ({}); log rolled back to {} bytes",
                e,
                prev_len
            ),
            Err(rollback) => {
                poisoned.store(true, Ordering::Release);
                tracing::error!(
                    "Append failed ({}) and rollback to {} bytes failed ({}); refusing further appends",
                    e,
                    prev_len,
                    rollback
                );
            }
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory file that runs out of space after `capacity` bytes
    struct FullDisk {
        data: Vec<u8>,
        capacity: usize,
        truncate_fails: bool,
    }

    impl FullDisk {
        fn new(data: &[u8], capacity: usize) -> Self {
            Self {
                data: data.to_vec(),
                capacity,
                truncate_fails: false,
            }
        }
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::new(ErrorKind::Other, "no space left on device"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogFile for FullDisk {
        fn size(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::new(ErrorKind::Other, "read-only"));
            }
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_write_is_rolled_back() {
        let good = b"*1\r\n$4\r\nPING\r\n";
        let mut file = FullDisk::new(good, good.len() + 8);
        let poisoned = AtomicBool::new(false);

        let next = b"*3\r\n$3\r\nSET\r\n$1\r\nb\r\n$1\r\n2\r\n";
        let result = write_or_rollback(&mut file, next, false, &poisoned);

        assert!(matches!(result, Err(FerroError::Io(_))));
        assert_eq!(file.data, good);
        assert!(!poisoned.load(Ordering::Acquire));
    }

    #[test]
    fn test_failed_rollback_poisons() {
        let mut file = FullDisk::new(b"", 4);
        file.truncate_fails = true;
        let poisoned = AtomicBool::new(false);

        let result = write_or_rollback(&mut file, b"*1\r\n$4\r\nPING\r\n", false, &poisoned);
        assert!(result.is_err());
        assert!(poisoned.load(Ordering::Acquire));
    }

    #[test]
    fn test_write_that_fits_is_kept() {
        let mut file = FullDisk::new(b"", 64);
        let poisoned = AtomicBool::new(false);

        write_or_rollback(&mut file, b":1\r\n", true, &poisoned).unwrap();
        assert_eq!(file.data, b":1\r\n");
    }

    #[test]
    fn test_poisoned_log_refuses_appends() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = AppendLog::open(&temp_dir.path().join("appendonly.aof")).unwrap();
        log.poisoned.store(true, Ordering::Release);

        assert!(log.append(b":1\r\n").is_err());
        assert!(log.is_empty().unwrap());
    }
}
