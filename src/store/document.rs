//! Directory-backed JSON document store.
//!
//! Layout is `root/{collection}/{key}.json`. Every operation on a collection
//! runs under that collection's lock; writes land in a temporary file in the
//! collection directory and are renamed over the target, so a reader never
//! observes a partially written document.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::locks::{CollectionLock, LockRegistry};
use crate::error::{AuthError, AuthResult};
use crate::validation::{validate_collection, validate_key};

const DOCUMENT_EXTENSION: &str = "json";

/// Options for opening a [`Store`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Write indented JSON (default: true)
    pub pretty: bool,

    /// fsync each document before the rename and its directory after (default: true)
    pub sync: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            sync: true,
        }
    }
}

impl StoreOptions {
    /// Set whether documents are written as indented JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether documents are flushed to disk before the rename.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Embedded document store.
///
/// A `Store` exclusively owns its root directory. It is `Send + Sync`; share
/// it behind an `Arc` between request handlers.
///
/// # Example
///
/// ```rust
/// use authstore::store::{Store, StoreOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     email: String,
/// }
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Store::open(dir.path(), StoreOptions::default()).unwrap();
///
/// let user = User { email: "alice@example.com".into() };
/// store.write("users", "alice", &user).unwrap();
///
/// let loaded: User = store.read("users", "alice").unwrap();
/// assert_eq!(loaded, user);
/// ```
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    options: StoreOptions,
    locks: LockRegistry,
}

impl Store {
    /// Open a store rooted at `root`, creating the directory tree if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>, options: StoreOptions) -> AuthResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        tracing::debug!(root = %root.display(), "opened document store");

        Ok(Self {
            root,
            options,
            locks: LockRegistry::new(),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Write `record` as the document at (`collection`, `key`), replacing any
    /// previous content.
    pub fn write<T>(&self, collection: &str, key: &str, record: &T) -> AuthResult<()>
    where
        T: Serialize + ?Sized,
    {
        validate_collection(collection)?;
        validate_key(key)?;

        let bytes = self.encode(record)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        self.replace_document(collection, key, &bytes)
    }

    /// Read, modify and write back one document under a single lock hold.
    ///
    /// Returns the updated record. Fails with [`AuthError::NotFound`] if the
    /// document does not exist.
    pub fn update<T, F>(&self, collection: &str, key: &str, f: F) -> AuthResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        validate_collection(collection)?;
        validate_key(key)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        let mut record: T = decode(&read_document(&self.document_path(collection, key))?)?;
        f(&mut record);
        let bytes = self.encode(&record)?;
        self.replace_document(collection, key, &bytes)?;
        Ok(record)
    }

    /// Atomically replace the document file. Caller must hold the collection lock.
    fn replace_document(&self, collection: &str, key: &str, bytes: &[u8]) -> AuthResult<()> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        tmp.write_all(bytes)?;
        if self.options.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(self.document_path(collection, key))
            .map_err(|e| AuthError::Io(e.error))?;
        if self.options.sync {
            sync_dir(&dir)?;
        }

        tracing::debug!(collection = %collection, key = %key, bytes = bytes.len(), "wrote document");
        Ok(())
    }

    /// Read the document at (`collection`, `key`).
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if the document does not exist
    /// - [`AuthError::Corrupt`] if it cannot be deserialized into `T`
    pub fn read<T: DeserializeOwned>(&self, collection: &str, key: &str) -> AuthResult<T> {
        validate_collection(collection)?;
        validate_key(key)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        let bytes = read_document(&self.document_path(collection, key))?;
        decode(&bytes)
    }

    /// Read every document in `collection`, in no particular order.
    ///
    /// A collection that was never written reads as empty.
    pub fn read_all<T: DeserializeOwned>(&self, collection: &str) -> AuthResult<Vec<T>> {
        validate_collection(collection)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        self.document_paths(collection)?
            .iter()
            .map(|path| read_document(path).and_then(|bytes| decode(&bytes)))
            .collect()
    }

    /// Keys of every document in `collection`, sorted.
    pub fn keys(&self, collection: &str) -> AuthResult<Vec<String>> {
        validate_collection(collection)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        let mut keys: Vec<String> = self
            .document_paths(collection)?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Whether a document exists at (`collection`, `key`).
    pub fn exists(&self, collection: &str, key: &str) -> AuthResult<bool> {
        validate_collection(collection)?;
        validate_key(key)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        Ok(self.document_path(collection, key).is_file())
    }

    /// Delete one document, or the whole collection when `key` is empty.
    ///
    /// Deleting something that does not exist succeeds.
    pub fn delete(&self, collection: &str, key: &str) -> AuthResult<()> {
        validate_collection(collection)?;
        if !key.is_empty() {
            validate_key(key)?;
        }

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        let result = if key.is_empty() {
            fs::remove_dir_all(self.collection_dir(collection))
        } else {
            fs::remove_file(self.document_path(collection, key))
        };

        match result {
            Ok(()) => {
                tracing::debug!(collection = %collection, key = %key, "deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete one document, reporting whether it existed.
    ///
    /// The check and the removal happen under one lock hold, so of several
    /// concurrent calls for the same document exactly one returns `true`.
    pub fn remove(&self, collection: &str, key: &str) -> AuthResult<bool> {
        validate_collection(collection)?;
        validate_key(key)?;

        let lock = self.lock_for(collection);
        let _guard = lock.lock();

        match fs::remove_file(self.document_path(collection, key)) {
            Ok(()) => {
                tracing::debug!(collection = %collection, key = %key, "removed document");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lock serializing access to `collection`.
    pub(crate) fn lock_for(&self, collection: &str) -> CollectionLock {
        self.locks.get_or_create(collection)
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn document_path(&self, collection: &str, key: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{key}.{DOCUMENT_EXTENSION}"))
    }

    /// Paths of the `.json` files directly under the collection directory.
    /// Caller must hold the collection lock.
    fn document_paths(&self, collection: &str) -> AuthResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(self.collection_dir(collection)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn encode<T: Serialize + ?Sized>(&self, record: &T) -> AuthResult<Vec<u8>> {
        let encoded = if self.options.pretty {
            serde_json::to_vec_pretty(record)
        } else {
            serde_json::to_vec(record)
        };
        encoded.map_err(|e| AuthError::Internal(format!("Failed to serialize record: {}", e)))
    }
}

fn read_document(path: &Path) -> AuthResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AuthError::NotFound,
        _ => AuthError::Io(e),
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> AuthResult<T> {
    serde_json::from_slice(bytes).map_err(|e| AuthError::Corrupt(e.to_string()))
}

/// Flush a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
