//! Directory-backed storage medium for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::medium::StorageMedium;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "rec";

/// A directory-backed storage medium.
///
/// Every key is stored in its own file, named after the hex encoding of the
/// key, so arbitrary keys map to portable file names. Values survive process
/// restarts.
///
/// # Durability
///
/// - `set` writes a temporary file, syncs it, and renames it over the record
/// - `flush` syncs the directory so renames and removals are durable
///
/// # Example
///
/// ```no_run
/// use journal_storage::{DirectoryMedium, StorageMedium};
/// use std::path::Path;
///
/// let mut medium = DirectoryMedium::open(Path::new("journal-cache")).unwrap();
/// medium.set("journal:entry:1", "{}").unwrap();
/// medium.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct DirectoryMedium {
    path: PathBuf,
    lock: RwLock<()>,
}

impl DirectoryMedium {
    /// Opens or creates a medium rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            lock: RwLock::new(()),
        })
    }

    /// Returns the directory holding the records.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.path
            .join(format!("{}.{}", hex::encode(key), RECORD_EXTENSION))
    }

    fn key_from_file_name(name: &str) -> Option<String> {
        let stem = name.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl StorageMedium for DirectoryMedium {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.read();
        match fs::read(self.record_path(key)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::Corrupted(format!("record {key} is not UTF-8"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.write();
        let target = self.record_path(key);
        let staging = target.with_extension("tmp");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)?;
        if let Err(e) = file.write_all(value.as_bytes()).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.write();
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let _guard = self.lock.read();
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.path)? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            // Foreign files and leftover staging files are not records
            if let Some(key) = name.to_str().and_then(Self::key_from_file_name) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn flush(&mut self) -> StorageResult<()> {
        let _guard = self.lock.write();
        // Directory fsync is not supported on every platform
        #[cfg(unix)]
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }
}
