use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::app_dirs::AppDirs;

/// History is capped to the most recent sessions.
pub const MAX_SESSIONS: usize = 10;

/// Two appends of the same duration within this window are one session.
/// Guards against the completion path firing twice.
pub const DEDUP_WINDOW_MS: i64 = 2000;

/// One completed meditation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    /// Seconds meditated.
    pub duration: u64,
    /// Completion wall-clock time, ISO-8601 in the file.
    pub date: DateTime<Utc>,
}

/// Persisted session history. Newest first, at most `MAX_SESSIONS` entries.
pub trait SessionStore {
    /// Record a completed session. Callers must not pass `duration == 0`.
    /// Duplicates (same duration, completed within `DEDUP_WINDOW_MS`) are
    /// silently dropped.
    fn append(&self, duration: u64, completed_at: DateTime<Utc>) -> std::io::Result<()>;

    /// Remove the record with the given id. Unknown ids are a no-op.
    fn delete(&self, id: &str) -> std::io::Result<()>;

    /// All stored records, newest first. Absent or corrupt storage reads
    /// as empty rather than erroring.
    fn list(&self) -> Vec<SessionRecord>;
}

/// Prepend a new record unless it duplicates an existing one; keep the list
/// within `MAX_SESSIONS`. Returns false when the candidate was dropped.
fn push_record(
    records: &mut Vec<SessionRecord>,
    duration: u64,
    completed_at: DateTime<Utc>,
) -> bool {
    let is_duplicate = records.iter().any(|r| {
        r.duration == duration
            && (completed_at - r.date).num_milliseconds().abs() < DEDUP_WINDOW_MS
    });
    if is_duplicate {
        return false;
    }

    records.insert(
        0,
        SessionRecord {
            id: completed_at.timestamp_millis().to_string(),
            duration,
            date: completed_at,
        },
    );
    records.truncate(MAX_SESSIONS);
    true
}

/// Session history persisted as a JSON file under the user's state directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::sessions_path().unwrap_or_else(|| PathBuf::from("zazen_sessions.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Vec<SessionRecord> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(mut records) = serde_json::from_slice::<Vec<SessionRecord>>(&bytes) {
                records.truncate(MAX_SESSIONS);
                return records;
            }
        }
        Vec::new()
    }

    fn save(&self, records: &[SessionRecord]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(records).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

impl SessionStore for FileSessionStore {
    fn append(&self, duration: u64, completed_at: DateTime<Utc>) -> std::io::Result<()> {
        let mut records = self.load();
        if push_record(&mut records, duration, completed_at) {
            self.save(&records)?;
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> std::io::Result<()> {
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() != before {
            self.save(&records)?;
        }
        Ok(())
    }

    fn list(&self) -> Vec<SessionRecord> {
        self.load()
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn append(&self, duration: u64, completed_at: DateTime<Utc>) -> std::io::Result<()> {
        let mut records = self.records.lock().unwrap();
        push_record(&mut records, duration, completed_at);
        Ok(())
    }

    fn delete(&self, id: &str) -> std::io::Result<()> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    fn list(&self) -> Vec<SessionRecord> {
        self.records.lock().unwrap().clone()
    }
}

/// One-shot handoff of a duration from the history view to the timer screen.
/// Reading the slot clears it, so a repeat request applies to exactly one
/// timer screen entry.
#[derive(Debug, Default)]
pub struct RepeatSlot {
    requested: Option<u32>,
}

impl RepeatSlot {
    pub fn set(&mut self, duration_secs: u32) {
        self.requested = Some(duration_secs);
    }

    pub fn take(&mut self) -> Option<u32> {
        self.requested.take()
    }
}
