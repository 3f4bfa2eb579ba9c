//! File-per-key JSON persistence with external-change detection.
//!
//! Each [`StoreKey`] maps to one JSON document in the store directory. Keys
//! are independent last-write-wins cells: there is no lock and no atomicity
//! across keys, only the atomic temp-file-then-rename write within one key.
//! A content-hash journal remembers what this context last wrote or read, so
//! [`Store::poll_changes`] reports exactly the keys some *other* context
//! modified — a context never observes its own writes.

use crate::error::StoreError;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Scan interval for [`Store::wait_for_change`] on unwatched stores.
const UNWATCHED_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The five persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Events,
    Users,
    CurrentUser,
    Theme,
    Rsvps,
}

impl StoreKey {
    /// Every key, in scan order.
    pub const ALL: [StoreKey; 5] = [
        StoreKey::Events,
        StoreKey::Users,
        StoreKey::CurrentUser,
        StoreKey::Theme,
        StoreKey::Rsvps,
    ];

    /// Name of the file backing this key inside the store directory.
    pub fn file_name(self) -> &'static str {
        match self {
            StoreKey::Events => "events.json",
            StoreKey::Users => "users.json",
            StoreKey::CurrentUser => "current-user.json",
            StoreKey::Theme => "theme.json",
            StoreKey::Rsvps => "rsvps.json",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Outcome of [`Store::wait_for_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitResult {
    /// Keys another context modified since this context last read or wrote
    /// them.
    Changed(Vec<StoreKey>),
    Timeout,
}

/// Key-value persistence adapter over a directory of JSON files.
///
/// Reads are fail-soft: a missing or undecodable value becomes the
/// caller-supplied default, never an error. Writes are atomic per key and
/// report failure to the caller, who decides whether to surface it — the
/// optimistic-local design keeps in-memory state authoritative either way.
pub struct Store {
    dir: PathBuf,
    journal: HashMap<StoreKey, u64>,
    watch: Option<DirWatch>,
}

struct DirWatch {
    rx: Receiver<notify::Result<notify::Event>>,
    // Held so the watch stays registered; dropping it unsubscribes.
    _watcher: RecommendedWatcher,
}

impl DirWatch {
    fn start(dir: &Path) -> Result<DirWatch, StoreError> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event| {
            // The receiver may be gone during teardown; nothing to do then.
            let _ = tx.send(event);
        })
        .map_err(|source| StoreError::Watch {
            path: dir.to_path_buf(),
            source,
        })?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| StoreError::Watch {
                path: dir.to_path_buf(),
                source,
            })?;
        Ok(DirWatch { rx, _watcher: watcher })
    }
}

impl Store {
    /// Open or create a store in `dir` and start watching the directory for
    /// writes made by other contexts.
    pub fn open(dir: impl AsRef<Path>) -> Result<Store, StoreError> {
        Store::open_inner(dir.as_ref(), true)
    }

    /// Open without a filesystem watcher.
    ///
    /// [`poll_changes`](Store::poll_changes) still works — it compares
    /// content hashes, not watcher events — but
    /// [`wait_for_change`](Store::wait_for_change) degrades to a scan loop.
    pub fn open_unwatched(dir: impl AsRef<Path>) -> Result<Store, StoreError> {
        Store::open_inner(dir.as_ref(), false)
    }

    fn open_inner(dir: &Path, watched: bool) -> Result<Store, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let watch = if watched {
            Some(DirWatch::start(dir)?)
        } else {
            None
        };
        Ok(Store {
            dir: dir.to_path_buf(),
            journal: HashMap::new(),
            watch,
        })
    }

    /// Read and decode the value at `key`.
    ///
    /// Fail-soft: a missing file yields `default`, and undecodable contents
    /// are logged and replaced by `default`.
    pub fn read<T: DeserializeOwned>(&mut self, key: StoreKey, default: T) -> T {
        let Some(raw) = self.read_raw(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("store: undecodable value for {key}, using default: {err}");
                default
            }
        }
    }

    /// Read a collection, decoding element by element.
    ///
    /// One malformed record does not evict its neighbors: offending elements
    /// are logged and skipped, the rest decode normally.
    pub fn read_records<T: DeserializeOwned>(&mut self, key: StoreKey) -> Vec<T> {
        let Some(raw) = self.read_raw(key) else {
            return Vec::new();
        };
        let items: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                log::warn!("store: undecodable collection for {key}, using empty: {err}");
                return Vec::new();
            }
        };
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(record) => records.push(record),
                Err(err) => {
                    log::warn!("store: skipping malformed record {index} in {key}: {err}");
                }
            }
        }
        records
    }

    /// Serialize `value` and write it to `key`'s file atomically
    /// (process-unique temp file, sync, rename). On failure the previous
    /// on-disk value survives intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] or [`StoreError::Write`]; the caller
    /// decides whether to surface it.
    pub fn write<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Encode { key, source })?;
        let path = self.path_of(key);
        let tmp_path = self.tmp_path_of(key);
        let io_err = |source| StoreError::Write { key, source };

        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp_path, &path).map_err(io_err)?;

        self.journal.insert(key, content_hash(json.as_bytes()));
        Ok(())
    }

    /// Delete the value at `key`.
    ///
    /// Idempotent — removing an absent key succeeds. A stale temp file left
    /// by an interrupted write in this process is cleaned up as well.
    pub fn remove(&mut self, key: StoreKey) -> Result<(), StoreError> {
        for target in [self.path_of(key), self.tmp_path_of(key)] {
            match fs::remove_file(&target) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Remove { key, source }),
            }
        }
        self.journal.remove(&key);
        Ok(())
    }

    /// Keys whose on-disk content no longer matches what this context last
    /// wrote or read.
    ///
    /// Self-originated writes never show up here: `write` journals the exact
    /// content it produced, so only another context's write can make the
    /// comparison fail. A reported key stays pending until it is re-read.
    pub fn poll_changes(&mut self) -> Vec<StoreKey> {
        self.drain_wakeups();
        self.scan_changes()
    }

    /// Block until some key changes externally or `timeout` elapses.
    pub fn wait_for_change(&mut self, timeout: Duration) -> WaitResult {
        let deadline = Instant::now() + timeout;
        let changed = self.poll_changes();
        if !changed.is_empty() {
            return WaitResult::Changed(changed);
        }
        loop {
            let now = Instant::now();
            if now >= deadline {
                return WaitResult::Timeout;
            }
            let remaining = deadline - now;
            let wakeup = self
                .watch
                .as_ref()
                .map(|watch| watch.rx.recv_timeout(remaining));
            match wakeup {
                Some(Ok(_)) => {}
                Some(Err(RecvTimeoutError::Timeout)) => return WaitResult::Timeout,
                Some(Err(RecvTimeoutError::Disconnected)) => {
                    log::warn!("store: change watcher stopped, falling back to scanning");
                    self.watch = None;
                }
                None => std::thread::sleep(remaining.min(UNWATCHED_POLL_INTERVAL)),
            }
            let changed = self.poll_changes();
            if !changed.is_empty() {
                return WaitResult::Changed(changed);
            }
        }
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a filesystem watcher is delivering wakeups.
    pub fn is_watched(&self) -> bool {
        self.watch.is_some()
    }

    fn drain_wakeups(&mut self) {
        if let Some(watch) = &self.watch {
            while watch.rx.try_recv().is_ok() {}
        }
    }

    fn scan_changes(&self) -> Vec<StoreKey> {
        let changed: Vec<StoreKey> = StoreKey::ALL
            .into_iter()
            .filter(|key| self.file_hash(*key) != self.journal.get(key).copied())
            .collect();
        if !changed.is_empty() {
            log::debug!("store: external changes pending for {changed:?}");
        }
        changed
    }

    /// Fingerprint of the current file contents, `None` when absent.
    fn file_hash(&self, key: StoreKey) -> Option<u64> {
        fs::read(self.path_of(key))
            .ok()
            .map(|bytes| content_hash(&bytes))
    }

    fn path_of(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Staging path for `key`'s atomic write. The name carries the process
    /// id, so writers in different processes never share a staging file.
    fn tmp_path_of(&self, key: StoreKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}.tmp", key.file_name(), std::process::id()))
    }

    /// Raw file contents, journaling the hash of whatever was observed.
    fn read_raw(&mut self, key: StoreKey) -> Option<String> {
        match fs::read_to_string(self.path_of(key)) {
            Ok(raw) => {
                self.journal.insert(key, content_hash(raw.as_bytes()));
                Some(raw)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.journal.remove(&key);
                None
            }
            Err(err) => {
                log::warn!("store: failed to read {key}: {err}");
                self.journal.remove(&key);
                None
            }
        }
    }
}

/// xxh64 fingerprint of raw file bytes, the unit of the change journal.
fn content_hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(bytes, 0)
}
