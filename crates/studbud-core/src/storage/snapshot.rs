//! SQLite-backed snapshot of the application state.
//!
//! The state is stored as five independent JSON values in a key-value
//! table, one per [`SnapshotKey`]. Loading tolerates missing or unreadable
//! values by falling back to that value's default; saving rewrites only
//! what changed.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use super::data_dir;
use crate::error::{Result, StoreError};
use crate::state::AppState;

/// Fixed keys of the persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKey {
    StudyGoal,
    GoalDetails,
    Subjects,
    TimeSlots,
    StudyPlan,
}

impl SnapshotKey {
    pub const ALL: [SnapshotKey; 5] = [
        SnapshotKey::StudyGoal,
        SnapshotKey::GoalDetails,
        SnapshotKey::Subjects,
        SnapshotKey::TimeSlots,
        SnapshotKey::StudyPlan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKey::StudyGoal => "studyGoal",
            SnapshotKey::GoalDetails => "goalDetails",
            SnapshotKey::Subjects => "subjects",
            SnapshotKey::TimeSlots => "timeSlots",
            SnapshotKey::StudyPlan => "studyPlan",
        }
    }

    /// This key's value in `state`, serialized.
    fn encode(self, state: &AppState) -> Result<String> {
        let json = match self {
            SnapshotKey::StudyGoal => serde_json::to_string(&state.goal)?,
            SnapshotKey::GoalDetails => serde_json::to_string(&state.goal_details)?,
            SnapshotKey::Subjects => serde_json::to_string(&state.subjects)?,
            SnapshotKey::TimeSlots => serde_json::to_string(&state.time_slots)?,
            SnapshotKey::StudyPlan => serde_json::to_string(&state.study_plan)?,
        };
        Ok(json)
    }

    fn changed(self, previous: &AppState, next: &AppState) -> bool {
        match self {
            SnapshotKey::StudyGoal => previous.goal != next.goal,
            SnapshotKey::GoalDetails => previous.goal_details != next.goal_details,
            SnapshotKey::Subjects => previous.subjects != next.subjects,
            SnapshotKey::TimeSlots => previous.time_slots != next.time_slots,
            SnapshotKey::StudyPlan => previous.study_plan != next.study_plan,
        }
    }
}

/// Key-value snapshot store.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open the store at `~/.config/studbud/studbud.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studbud.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Raw JSON text stored under `key`, if any.
    pub fn get_raw(&self, key: SnapshotKey) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: SnapshotKey) -> Result<T> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot value '{}': {}", key.as_str(), e);
                Ok(T::default())
            }
        }
    }

    /// Read the snapshot, using defaults for missing or unreadable values.
    ///
    /// # Errors
    /// Returns an error only if the database itself cannot be queried.
    pub fn load(&self) -> Result<AppState> {
        Ok(AppState {
            goal: self.read_or_default(SnapshotKey::StudyGoal)?,
            goal_details: self.read_or_default(SnapshotKey::GoalDetails)?,
            subjects: self.read_or_default(SnapshotKey::Subjects)?,
            time_slots: self.read_or_default(SnapshotKey::TimeSlots)?,
            study_plan: self.read_or_default(SnapshotKey::StudyPlan)?,
        })
    }

    /// Write all five values in one transaction.
    pub fn save(&mut self, state: &AppState) -> Result<()> {
        self.write_keys(state, &SnapshotKey::ALL)
    }

    /// Write only the values that differ between `previous` and `next`.
    ///
    /// Returns the keys that were written.
    pub fn persist(&mut self, previous: &AppState, next: &AppState) -> Result<Vec<SnapshotKey>> {
        let changed: Vec<SnapshotKey> = SnapshotKey::ALL
            .into_iter()
            .filter(|key| key.changed(previous, next))
            .collect();
        if !changed.is_empty() {
            self.write_keys(next, &changed)?;
        }
        tracing::debug!("Persisted snapshot keys: {:?}", changed);
        Ok(changed)
    }

    fn write_keys(&mut self, state: &AppState, keys: &[SnapshotKey]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for key in keys {
            tx.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key.as_str(), key.encode(state)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Drop every stored value; the next load yields defaults.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}
