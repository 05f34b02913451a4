//! Durable storage slot for the cart.
//!
//! The cart lives in a single named slot that is read once at startup and
//! overwritten wholesale after every mutation. There is no incremental
//! persistence and no versioning.
//!
//! A file slot has exactly one writer. Opening it takes an exclusive lock
//! that is held until the storage is dropped, so a second process (or a
//! second store in the same process) cannot overwrite the owner's cart.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use quality_bearings_core::Cart;
use thiserror::Error;
use uuid::Uuid;

/// Errors reading or writing the cart slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The slot could not be read or written.
    #[error("cart storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another owner holds the slot's lock.
    #[error("cart at {path} is in use by another process")]
    Locked { path: PathBuf },

    /// The slot holds data that is not a valid cart.
    #[error("cart storage is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The cart could not be serialized.
    #[error("cart serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A single durable slot holding the serialized cart.
pub trait CartStorage: Send + Sync {
    /// Read the slot. `Ok(None)` means nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or does not hold a valid cart.
    fn load(&self) -> Result<Option<Cart>, StorageError>;

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or written.
    fn save(&self, cart: &Cart) -> Result<(), StorageError>;
}

// =============================================================================
// JSON file slot
// =============================================================================

/// Cart slot backed by one JSON file, owned exclusively while open.
///
/// The lock lives on a sibling `<name>.lock` file, since saves replace the
/// slot file itself. Each save writes a uniquely named temp file and renames
/// it over the slot, so a crash mid-write never leaves a truncated cart.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Closing the file releases the lock.
    _lock: File,
}

impl JsonFileStorage {
    /// Open the slot at `path` and take its lock.
    ///
    /// The slot file itself need not exist yet; its directory is created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if the slot is already open elsewhere,
    /// or [`StorageError::Io`] if the lock file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(&path, e))?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(sibling(&path, ".lock"))
            .map_err(|e| io_error(&path, e))?;

        match lock.try_lock_exclusive() {
            Ok(()) => Ok(Self { path, _lock: lock }),
            Err(e) if is_contended(&e) => Err(StorageError::Locked { path }),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Read the slot at `path` without taking its lock.
    ///
    /// Saves are atomic renames, so this sees either the previous or the next
    /// cart, never a partial one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid cart.
    pub fn peek(path: &Path) -> Result<Option<Cart>, StorageError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(StorageError::Corrupt)
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        Self::peek(&self.path)
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(cart).map_err(StorageError::Serialize)?;

        let temp = sibling(&self.path, &format!(".{}.tmp", Uuid::new_v4().simple()));
        let written = File::create(&temp).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&temp, &self.path)) {
            fs::remove_file(&temp).ok();
            return Err(io_error(&self.path, e));
        }
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

// =============================================================================
// In-memory slot
// =============================================================================

/// Cart slot held in process memory.
///
/// Stores the serialized text rather than the `Cart` so that loading goes
/// through the same parsing as the file slot.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-filled with raw text, valid or not.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw contents of the slot.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        self.raw()
            .map(|raw| serde_json::from_str(&raw).map_err(StorageError::Corrupt))
            .transpose()
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart).map_err(StorageError::Serialize)?;
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(json);
        Ok(())
    }
}

impl<S: CartStorage + ?Sized> CartStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        (**self).load()
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        (**self).save(cart)
    }
}
