use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, warn};

use crate::codec::{self, Entries};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::validate_key;
use crate::traits::{table, KvStore};

/// Mapping plus the file it is flushed to, guarded by one lock.
struct State {
    entries: Entries,
    /// `None` once the store has been closed.
    file: Option<File>,
    /// Set by any successful mutation.
    dirty: bool,
}

/// Key-value store held in memory and persisted to a flat file on close.
///
/// The file is read and decoded once by [`open`](Self::open); every CRUD
/// call afterwards works on the in-memory mapping only. [`close`](Self::close)
/// rewrites the whole file and releases the handle. A closed store rejects
/// every operation with [`StoreError::Closed`].
///
/// # Locking
///
/// Two locks are used and always taken in this order:
///
/// 1. `closed` (`RwLock<bool>`): CRUD calls hold it shared for their whole
///    duration, `close` holds it exclusively only to flip the flag.
/// 2. `state` (`Mutex`): serializes every access to the mapping and file.
///
/// Because a CRUD call keeps its shared hold while it works, `close` cannot
/// flip the flag until every call that already passed the closed check has
/// finished, and no call can start after the flag is set.
pub struct FileStore {
    path: PathBuf,
    config: StoreConfig,
    closed: RwLock<bool>,
    state: Mutex<State>,
}

impl FileStore {
    /// Open (or create) the store file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open (or create) the store file at `path` and load its entries.
    ///
    /// Returns [`StoreError::Open`] if the file cannot be opened or read and
    /// [`StoreError::Format`] if its content is malformed.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if config.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(open_error(&path))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(open_error(&path))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(open_error(&path))?;
        let entries = codec::decode_bytes(&bytes)?;

        debug!(path = %path.display(), entries = entries.len(), "store opened");

        Ok(Self {
            path,
            config,
            closed: RwLock::new(false),
            state: Mutex::new(State {
                entries,
                file: Some(file),
                dirty: false,
            }),
        })
    }

    /// Flush every entry to the backing file and release it.
    ///
    /// The file is truncated and rewritten from the start. Closing twice is
    /// an error. If writing fails the store stays closed, the handle is
    /// still released and [`StoreError::Persist`] is returned.
    pub fn close(&self) -> StoreResult<()> {
        {
            let mut closed = self.closed.write().unwrap_or_else(PoisonError::into_inner);
            if *closed {
                return Err(StoreError::Closed);
            }
            *closed = true;
        }

        let mut state = self.lock_state();
        let file = state.file.take().ok_or(StoreError::Closed)?;
        persist(file, &state.entries, self.config.sync_on_close).map_err(StoreError::Persist)?;
        state.dirty = false;

        debug!(path = %self.path.display(), entries = state.entries.len(), "store persisted");
        Ok(())
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        *self.closed.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        let _open = self.ensure_open()?;
        Ok(self.lock_state().entries.len())
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let _open = self.ensure_open()?;
        let mut keys: Vec<String> = self.lock_state().entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Shared hold on the closed flag, or `Err(Closed)`.
    ///
    /// Callers keep the guard alive while they hold the state lock.
    fn ensure_open(&self) -> StoreResult<RwLockReadGuard<'_, bool>> {
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(StoreError::Closed);
        }
        Ok(closed)
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Entries) -> StoreResult<T>) -> StoreResult<T> {
        let _open = self.ensure_open()?;
        let mut state = self.lock_state();
        let out = op(&mut state.entries)?;
        state.dirty = true;
        Ok(out)
    }
}

impl KvStore for FileStore {
    fn create(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.mutate(|entries| table::insert_new(entries, key, value))
    }

    fn read(&self, key: &str) -> StoreResult<String> {
        let _open = self.ensure_open()?;
        table::get(&self.lock_state().entries, key)
    }

    fn update(&self, key: &str, value: &str) -> StoreResult<()> {
        self.mutate(|entries| table::replace(entries, key, value))
    }

    fn delete(&self, key: &str) -> StoreResult<String> {
        self.mutate(|entries| table::remove(entries, key))
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        let closed = *self.closed.get_mut().unwrap_or_else(PoisonError::into_inner);
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !closed && state.dirty {
            warn!(
                path = %self.path.display(),
                entries = state.entries.len(),
                "store dropped without close; unsaved changes discarded"
            );
        }
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn open_error(path: &Path) -> impl Fn(io::Error) -> StoreError + '_ {
    move |source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    }
}

/// Truncate `file`, write `entries` from offset zero and drop the handle.
fn persist(mut file: File, entries: &Entries, sync: bool) -> io::Result<()> {
    file.set_len(0)?;
    write_entries(&mut file, entries)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

/// Rewind `w` and write the encoded `entries` through a buffer.
fn write_entries<W: Write + Seek>(w: &mut W, entries: &Entries) -> io::Result<()> {
    w.seek(SeekFrom::Start(0))?;
    let mut writer = BufWriter::new(w);
    codec::encode_to(entries, &mut writer)?;
    writer.flush()
}
