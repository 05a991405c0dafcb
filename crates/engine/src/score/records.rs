use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

use super::codec;
use crate::sim::MatchStatistics;

pub const DEFAULT_RECORD_CAPACITY: usize = 10;

/// Final result of one match, as stored locally and submitted remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonalRecord {
    time_seconds: u16,
    kills: u16,
}

impl PersonalRecord {
    pub fn new(time_seconds: i64, kills: i64) -> Self {
        Self::from_encoded(codec::encode(time_seconds, kills))
    }

    pub fn from_statistics(stats: &MatchStatistics) -> Self {
        let whole_seconds = if stats.play_time_seconds.is_finite() {
            stats.play_time_seconds.floor() as i64
        } else {
            0
        };
        Self::new(whole_seconds, i64::from(stats.kills))
    }

    pub fn from_encoded(encoded: i64) -> Self {
        let (time_seconds, kills) = codec::decode(encoded);
        Self {
            time_seconds: time_seconds as u16,
            kills: kills as u16,
        }
    }

    pub fn time_seconds(self) -> u16 {
        self.time_seconds
    }

    pub fn kills(self) -> u16 {
        self.kills
    }

    pub fn encoded(self) -> i64 {
        codec::encode(i64::from(self.time_seconds), i64::from(self.kills))
    }

    pub fn ranking_score(self) -> u32 {
        u32::from(self.time_seconds) * 10 + u32::from(self.kills)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Zero-based position in the book, `None` when the record did not make the cut.
    pub rank: Option<usize>,
    pub is_new_best: bool,
}

/// Top-N list of personal records, sorted by ranking score, highest first.
/// Records with equal score keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalRecordBook {
    capacity: usize,
    entries: Vec<PersonalRecord>,
}

impl Default for PersonalRecordBook {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECORD_CAPACITY)
    }
}

impl PersonalRecordBook {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    /// Builds a book from persisted values. Out-of-range fields are clamped by
    /// the codec rather than rejected, so legacy data always loads.
    pub fn from_encoded(capacity: usize, encoded: &[i64]) -> Self {
        let mut book = Self::with_capacity(capacity);
        for value in encoded {
            book.insert(PersonalRecord::from_encoded(*value));
        }
        book
    }

    pub fn to_encoded(&self) -> Vec<i64> {
        self.entries.iter().map(|record| record.encoded()).collect()
    }

    pub fn entries(&self) -> &[PersonalRecord] {
        &self.entries
    }

    pub fn best(&self) -> Option<PersonalRecord> {
        self.entries.first().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn insert(&mut self, record: PersonalRecord) -> InsertOutcome {
        let is_new_best = self
            .best()
            .map_or(true, |best| record.ranking_score() > best.ranking_score());
        let index = self
            .entries
            .iter()
            .position(|existing| existing.ranking_score() < record.ranking_score())
            .unwrap_or(self.entries.len());

        if index >= self.capacity {
            return InsertOutcome {
                rank: None,
                is_new_best: false,
            };
        }

        self.entries.insert(index, record);
        self.entries.truncate(self.capacity);
        InsertOutcome {
            rank: Some(index),
            is_new_best,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("failed to read record file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse record file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write record file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Key/value persistence for the encoded top-N list.
pub trait RecordStore {
    fn load_encoded(&self) -> Result<Vec<i64>, RecordStoreError>;
    fn save_encoded(&self, encoded: &[i64]) -> Result<(), RecordStoreError>;
}

/// Stores the list as a JSON array of integers, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileRecordStore {
    path: PathBuf,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileRecordStore {
    fn load_encoded(&self) -> Result<Vec<i64>, RecordStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "record_file_missing");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RecordStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| RecordStoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save_encoded(&self, encoded: &[i64]) -> Result<(), RecordStoreError> {
        let json = serde_json::to_string(encoded).map_err(RecordStoreError::Encode)?;
        replace_file_contents(&self.path, json.as_bytes()).map_err(|source| {
            RecordStoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Process-local store for hosts without a filesystem, and for tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    encoded: Mutex<Vec<i64>>,
}

impl MemoryRecordStore {
    pub fn with_encoded(encoded: Vec<i64>) -> Self {
        Self {
            encoded: Mutex::new(encoded),
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_encoded(&self) -> Result<Vec<i64>, RecordStoreError> {
        let guard = match self.encoded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }

    fn save_encoded(&self, encoded: &[i64]) -> Result<(), RecordStoreError> {
        let mut guard = match self.encoded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = encoded.to_vec();
        Ok(())
    }
}

fn replace_file_contents(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("records.json");
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp_path, bytes)?;

    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}
