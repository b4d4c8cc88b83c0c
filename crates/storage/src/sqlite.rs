use rusqlite::Connection;

use kbstep_core::{FieldValue, NormalizedUpdate, RawConfig, StepId};

use crate::error::StorageError;
use crate::traits::ConfigStore;

/// Step records persisted as one row per field, values MessagePack-encoded.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of writes a step has received; 0 for an unknown step.
    pub fn revision(&self, step: StepId) -> Result<u64, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT revision FROM steps WHERE step_id = ?1")?;
        let mut rows = stmt.query_map(rusqlite::params![step.as_bytes().as_slice()], |row| {
            row.get::<_, i64>(0)
        })?;
        match rows.next() {
            Some(Ok(rev)) => Ok(rev as u64),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(0),
        }
    }

    fn replace_record(&mut self, step: StepId, record: &RawConfig) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let step_bytes = step.as_bytes().as_slice();

        tx.execute(
            "INSERT INTO steps (step_id, revision) VALUES (?1, 1)
             ON CONFLICT(step_id) DO UPDATE SET
                revision = revision + 1,
                updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![step_bytes],
        )?;
        tx.execute(
            "DELETE FROM step_fields WHERE step_id = ?1",
            rusqlite::params![step_bytes],
        )?;
        for (key, value) in record {
            let bytes = value
                .to_msgpack()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            tx.execute(
                "INSERT INTO step_fields (step_id, field_key, value) VALUES (?1, ?2, ?3)",
                rusqlite::params![step_bytes, key, bytes],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

impl ConfigStore for SqliteStore {
    fn load(&self, step: StepId) -> Result<Option<RawConfig>, StorageError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM steps WHERE step_id = ?1)",
            rusqlite::params![step.as_bytes().as_slice()],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT field_key, value FROM step_fields WHERE step_id = ?1")?;
        let rows = stmt.query_map(rusqlite::params![step.as_bytes().as_slice()], |row| {
            let key: String = row.get(0)?;
            let val_bytes: Vec<u8> = row.get(1)?;
            Ok((key, val_bytes))
        })?;

        let mut record = RawConfig::new();
        for row in rows {
            let (key, val_bytes) = row?;
            let value = FieldValue::from_msgpack(&val_bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            record.insert(key, value);
        }
        Ok(Some(record))
    }

    fn apply_update(
        &mut self,
        step: StepId,
        update: &NormalizedUpdate,
    ) -> Result<(), StorageError> {
        self.replace_record(step, &update.to_record())?;
        tracing::debug!(%step, action = %update.action, "step record replaced");
        Ok(())
    }

    fn put_raw(&mut self, step: StepId, record: RawConfig) -> Result<(), StorageError> {
        self.replace_record(step, &record)
    }
}
