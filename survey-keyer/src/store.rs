//! Record stores: in-memory and one JSON file per questionnaire.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{AnswerRecord, RecordStore};

/// Errors from record stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store holds as many records as it may.
    #[error("Storage is full ({capacity} records); export and clear old records first")]
    Full { capacity: usize },

    /// No record at the given index.
    #[error("No record at index {0}")]
    OutOfRange(usize),

    /// Reading or writing the store file failed.
    #[error("Storage file '{path}' is unavailable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file does not contain valid records.
    #[error("Storage file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn check_capacity(len: usize, capacity: Option<usize>) -> Result<(), StoreError> {
    match capacity {
        Some(capacity) if len >= capacity => Err(StoreError::Full { capacity }),
        _ => Ok(()),
    }
}

/// A store that keeps records in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<AnswerRecord>,
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of records.
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Start from existing records.
    pub fn with_records(mut self, records: Vec<AnswerRecord>) -> Self {
        self.records = records;
        self
    }
}

impl RecordStore for MemoryStore {
    type Error = StoreError;

    fn add(&mut self, record: AnswerRecord) -> Result<usize, StoreError> {
        check_capacity(self.records.len(), self.capacity)?;
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    fn update(&mut self, index: usize, record: AnswerRecord) -> Result<(), StoreError> {
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::OutOfRange(index))?;
        *slot = record;
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<AnswerRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::OutOfRange(index));
        }
        Ok(self.records.remove(index))
    }

    fn all(&self) -> &[AnswerRecord] {
        &self.records
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    storage_key: String,
    #[serde(default)]
    records: Vec<AnswerRecord>,
}

/// A store backed by `<dir>/<storage_key>.json`.
///
/// Every mutation rewrites the file through a temporary sibling and a
/// rename. When writing fails, the in-memory records are rolled back so the
/// store never claims a record the file does not hold.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    storage_key: String,
    records: Vec<AnswerRecord>,
    capacity: Option<usize>,
}

impl JsonFileStore {
    /// Open (or start) the store for `storage_key` inside `dir`.
    pub fn open(dir: impl AsRef<Path>, storage_key: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.json", file_stem(storage_key)));
        let records = if path.exists() {
            let json = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let file: StoreFile =
                serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?;
            file.records
        } else {
            Vec::new()
        };
        tracing::info!(path = %path.display(), records = records.len(), "opened record store");
        Ok(Self {
            path,
            storage_key: storage_key.to_string(),
            records,
            capacity: None,
        })
    }

    /// Limit the number of records.
    pub fn with_capacity_limit(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            storage_key: self.storage_key.clone(),
            records: self.records.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl RecordStore for JsonFileStore {
    type Error = StoreError;

    fn add(&mut self, record: AnswerRecord) -> Result<usize, StoreError> {
        check_capacity(self.records.len(), self.capacity)?;
        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        Ok(self.records.len() - 1)
    }

    fn update(&mut self, index: usize, record: AnswerRecord) -> Result<(), StoreError> {
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::OutOfRange(index))?;
        let previous = std::mem::replace(slot, record);
        if let Err(err) = self.persist() {
            self.records[index] = previous;
            return Err(err);
        }
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<AnswerRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::OutOfRange(index));
        }
        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            return Err(err);
        }
        Ok(removed)
    }

    fn all(&self) -> &[AnswerRecord] {
        &self.records
    }
}

/// Storage keys become file names; anything but letters, digits, `-` and `_`
/// is replaced.
fn file_stem(storage_key: &str) -> String {
    let stem: String = storage_key
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "records".to_string()
    } else {
        stem
    }
}
