use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::components::history::{Snapshot, now_ms};
use crate::error::StoreError;

// ============================================================================
// SNAPSHOT STORE — durable, session-independent snapshot persistence
// ============================================================================
//
// One bincode record file per saved snapshot, named `<id>.pfs`, under a
// store directory (the app data dir by default). Records are insert-only:
// they are enumerated or bulk-cleared, never individually deleted or
// mutated.

/// Magic header for snapshot record files (v1).
const RECORD_MAGIC: &str = "PFS1";

/// File extension for snapshot record files.
const RECORD_EXT: &str = "pfs";

/// On-disk record layout.
#[derive(Serialize, Deserialize)]
struct RecordFile {
    magic: String,
    id: i64,
    created_at_ms: i64,
    content: Vec<u8>,
}

/// A snapshot persisted beyond the current session.
///
/// `id` is a creation timestamp in milliseconds, bumped to stay strictly
/// monotonic across rapid successive saves, so sorting by id descending
/// yields newest-first chronological order.
#[derive(Clone, Debug)]
pub struct SavedRecord {
    pub id: i64,
    pub created_at_ms: i64,
    pub content: Vec<u8>,
}

/// Durable key-value record store for canvas snapshots.
pub struct SnapshotStore {
    dir: PathBuf,
    last_id: i64,
}

impl SnapshotStore {
    /// Idempotently open (and create if absent) the store at `dir`.
    ///
    /// Scans existing records so id monotonicity survives restarts.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", dir.display(), e)))?;

        let mut store = Self { dir, last_id: 0 };
        store.last_id = store
            .record_paths()
            .iter()
            .filter_map(|p| id_from_path(p))
            .max()
            .unwrap_or(0);
        Ok(store)
    }

    /// Open the store at the default location under the OS data dir.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(crate::logger::app_data_dir().join("snapshots"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Insert a new record for `snapshot`. Assigns a unique id; concurrent
    /// records never collide. The write goes through a temp file and a
    /// rename so a failed transaction leaves no partial record behind.
    pub fn put(&mut self, snapshot: &Snapshot) -> Result<SavedRecord, StoreError> {
        let id = self.next_id();
        let record = RecordFile {
            magic: RECORD_MAGIC.to_string(),
            id,
            created_at_ms: snapshot.created_at_ms,
            content: snapshot.content.clone(),
        };

        let final_path = self.dir.join(format!("{}.{}", id, RECORD_EXT));
        let tmp_path = self.dir.join(format!("{}.{}.tmp", id, RECORD_EXT));

        let write = (|| -> Result<(), String> {
            let file = File::create(&tmp_path).map_err(|e| e.to_string())?;
            let writer = BufWriter::new(file);
            bincode::serialize_into(writer, &record).map_err(|e| e.to_string())?;
            fs::rename(&tmp_path, &final_path).map_err(|e| e.to_string())
        })();

        if let Err(e) = write {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::WriteFailed(format!(
                "{}: {}",
                final_path.display(),
                e
            )));
        }

        crate::log_info!("store: saved record {} ({} bytes)", id, record.content.len());
        Ok(SavedRecord {
            id,
            created_at_ms: record.created_at_ms,
            content: record.content,
        })
    }

    /// Enumerate every record. No ordering guarantee — callers sort for
    /// presentation. Returns an empty vec (never an error) when the store
    /// holds no records; unreadable files are skipped with a logged warning.
    pub fn get_all(&self) -> Vec<SavedRecord> {
        let mut records = Vec::new();
        for path in self.record_paths() {
            match read_record(&path) {
                Ok(rec) => records.push(rec),
                Err(e) => {
                    crate::log_warn!("store: skipping {}: {}", path.display(), e);
                }
            }
        }
        records
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.record_paths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_paths().is_empty()
    }

    /// Destroy all records irreversibly. The caller must obtain explicit
    /// user confirmation before invoking this — the store never prompts.
    /// Returns the number of records removed.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for path in self.record_paths() {
            fs::remove_file(&path)
                .map_err(|e| StoreError::WriteFailed(format!("{}: {}", path.display(), e)))?;
            removed += 1;
        }
        crate::log_info!("store: cleared {} record(s)", removed);
        Ok(removed)
    }

    /// Next unique record id: a millisecond timestamp, bumped past the last
    /// issued id so rapid successive saves within one clock tick never
    /// collide.
    fn next_id(&mut self) -> i64 {
        let id = now_ms().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    fn record_paths(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                crate::log_warn!("store: cannot enumerate {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT))
            .collect()
    }
}

fn id_from_path(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn read_record(path: &Path) -> Result<SavedRecord, StoreError> {
    let raw = fs::read(path).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let record: RecordFile =
        bincode::deserialize(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    if record.magic != RECORD_MAGIC {
        return Err(StoreError::Corrupt(format!(
            "unknown magic '{}'",
            record.magic
        )));
    }
    Ok(SavedRecord {
        id: record.id,
        created_at_ms: record.created_at_ms,
        content: record.content,
    })
}
