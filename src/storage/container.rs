//! File-backed named-object container
//!
//! Layout: an 8-byte magic followed by append-only object records. Opening
//! for read validates every record; a later record for the same name
//! supersedes earlier ones.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{StorageError, StorageResult};
use super::record::ObjectRecord;

/// Container file magic
pub const STORAGE_MAGIC: &[u8; 8] = b"CONDSTR1";

/// Access mode of an open container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Existing container, read-only
    Read,
    /// Container truncated at open, writable
    Recreate,
}

/// Handle to an open storage container
#[derive(Debug)]
pub struct ConditionsStorage {
    path: PathBuf,
    mode: StorageMode,
    /// Present only in `Recreate` mode
    file: Option<File>,
    /// Latest payload per object name
    objects: HashMap<String, Vec<u8>>,
    /// Names in order of first appearance
    order: Vec<String>,
}

impl ConditionsStorage {
    /// Opens an existing container for reading.
    ///
    /// # Errors
    ///
    /// `COND_STORAGE_OPEN_FAILED` if the file cannot be read, lacks the
    /// magic, or holds any malformed record.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let data = fs::read(path).map_err(|e| StorageError::open_failed(path, e))?;

        if data.len() < STORAGE_MAGIC.len() || &data[..STORAGE_MAGIC.len()] != STORAGE_MAGIC {
            return Err(StorageError::open_corrupt(path, 0, "missing container magic"));
        }

        let mut storage = Self {
            path: path.to_path_buf(),
            mode: StorageMode::Read,
            file: None,
            objects: HashMap::new(),
            order: Vec::new(),
        };

        let mut offset = STORAGE_MAGIC.len();
        while offset < data.len() {
            let (record, consumed) = ObjectRecord::deserialize(&data[offset..])
                .map_err(|reason| StorageError::open_corrupt(path, offset as u64, reason))?;
            storage.remember(record);
            offset += consumed;
        }

        Ok(storage)
    }

    /// Creates (or truncates) a container for writing.
    ///
    /// # Errors
    ///
    /// `COND_STORAGE_OPEN_FAILED` if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::open_failed(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StorageError::open_failed(path, e))?;

        file.write_all(STORAGE_MAGIC)
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::open_failed(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            mode: StorageMode::Recreate,
            file: Some(file),
            objects: HashMap::new(),
            order: Vec::new(),
        })
    }

    /// Path of the container file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Access mode
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Serializes `value` as JSON and appends it under `name`.
    ///
    /// Returns the number of bytes written, record framing included.
    pub fn write_object<T: Serialize>(&mut self, name: &str, value: &T) -> StorageResult<usize> {
        let payload = serde_json::to_vec(value).map_err(|e| {
            StorageError::write_rejected(format!("failed to serialize object {}: {}", name, e))
        })?;
        if payload.len() > u32::MAX as usize / 2 {
            return Err(StorageError::write_rejected(format!(
                "object {} too large: {} bytes",
                name,
                payload.len()
            )));
        }

        let file = self.file.as_mut().ok_or_else(|| {
            StorageError::write_rejected(format!(
                "storage opened read-only: {}",
                self.path.display()
            ))
        })?;

        let record = ObjectRecord::new(name, payload);
        let bytes = record.serialize();

        file.write_all(&bytes)
            .map_err(|e| StorageError::write_failed(format!("failed to write object: {}", name), e))?;
        file.sync_all().map_err(|e| {
            StorageError::write_failed(format!("fsync failed after writing object: {}", name), e)
        })?;

        self.remember(record);
        Ok(bytes.len())
    }

    /// Reads and decodes the object stored under `name`.
    ///
    /// # Errors
    ///
    /// - `COND_OBJECT_NOT_FOUND` if no such object exists
    /// - `COND_STORAGE_CORRUPTION` if the payload does not decode as `T`
    pub fn read_object<T: DeserializeOwned>(&self, name: &str) -> StorageResult<T> {
        let payload = self
            .objects
            .get(name)
            .ok_or_else(|| StorageError::object_not_found(name, &self.path))?;
        serde_json::from_slice(payload)
            .map_err(|e| StorageError::corruption_for_object(name, format!("decode failed: {}", e)))
    }

    /// True if an object named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Object names in order of first appearance
    pub fn object_names(&self) -> &[String] {
        &self.order
    }

    /// Flushes and releases the file handle
    pub fn close(mut self) -> StorageResult<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()
                .map_err(|e| StorageError::write_failed("fsync failed on close", e))?;
        }
        Ok(())
    }

    fn remember(&mut self, record: ObjectRecord) {
        if !self.objects.contains_key(&record.name) {
            self.order.push(record.name.clone());
        }
        self.objects.insert(record.name, record.payload);
    }
}
