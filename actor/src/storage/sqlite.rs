//! SQLite backend for the replay ring.
//!
//! Persists the ring across process restarts so a long self-play campaign
//! can be resumed without losing its buffer. The write cursor and current
//! size live in a `meta` table; entries are keyed by their ring slot.

use rusqlite::{params, Connection, OptionalExtension};
use rand_chacha::ChaCha20Rng;
use std::path::Path;

use super::{
    decode_f32s, draw_prioritized_indices, draw_uniform_indices, effective_priority, encode_f32s,
    ReplayEntry, ReplayError, ReplayStore,
};

/// Durable replay ring backed by a single SQLite database file.
///
/// Each `add` runs in its own transaction that writes the entry and both
/// meta rows, so a crash leaves the cursor and the entries consistent.
#[derive(Debug)]
pub struct SqliteReplayStore {
    conn: Connection,
    capacity: usize,
    /// Next slot to write, mirrored from the `meta` table.
    cursor: usize,
    /// Entries currently stored, mirrored from the `meta` table.
    size: usize,
}

impl SqliteReplayStore {
    /// Open (or create) the database at `db_path`. An existing ring resumes
    /// from its persisted cursor and size.
    pub fn open(db_path: &str, capacity: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                slot INTEGER PRIMARY KEY,
                state BLOB NOT NULL,
                policy BLOB NOT NULL,
                value REAL NOT NULL,
                priority REAL NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            )",
            [],
        )?;

        let cursor = read_meta(&conn, "next_write_cursor")?.unwrap_or(0);
        let size = read_meta(&conn, "current_size")?.unwrap_or(0);
        // A ring written under a larger capacity holds slots this one
        // could never reach.
        if cursor >= capacity || size > capacity {
            return Err(ReplayError::CapacityMismatch {
                cursor,
                size,
                capacity,
            });
        }

        Ok(Self {
            conn,
            capacity,
            cursor,
            size,
        })
    }

    fn gather(&self, slots: &[usize]) -> Result<Vec<ReplayEntry>, ReplayError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT state, policy, value, priority FROM entries WHERE slot = ?1")?;

        let mut batch = Vec::with_capacity(slots.len());
        for &slot in slots {
            let entry = stmt.query_row(params![slot as i64], |row| {
                let state: Vec<u8> = row.get(0)?;
                let policy: Vec<u8> = row.get(1)?;
                Ok(ReplayEntry {
                    state: decode_f32s(&state),
                    policy: decode_f32s(&policy),
                    value: row.get(2)?,
                    priority: row.get(3)?,
                })
            })?;
            batch.push(entry);
        }
        Ok(batch)
    }

    fn priorities(&self) -> Result<Vec<f32>, ReplayError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT priority FROM entries ORDER BY slot")?;
        let priorities = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<f32>, _>>()?;
        Ok(priorities)
    }
}

impl ReplayStore for SqliteReplayStore {
    fn add(
        &mut self,
        state: Vec<f32>,
        policy: Vec<f32>,
        value: f32,
        priority: Option<f32>,
    ) -> Result<(), ReplayError> {
        let priority = effective_priority(value, priority);
        let next_cursor = (self.cursor + 1) % self.capacity;
        let next_size = (self.size + 1).min(self.capacity);

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO entries (slot, state, policy, value, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            stmt.execute(params![
                self.cursor as i64,
                encode_f32s(&state),
                encode_f32s(&policy),
                value,
                priority,
            ])?;

            let mut meta = tx.prepare_cached(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            )?;
            meta.execute(params!["next_write_cursor", next_cursor as i64])?;
            meta.execute(params!["current_size", next_size as i64])?;
        }
        tx.commit()?;

        self.cursor = next_cursor;
        self.size = next_size;
        Ok(())
    }

    fn len(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn sample(
        &mut self,
        batch_size: usize,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError> {
        let slots = draw_uniform_indices(self.size, batch_size, rng)?;
        self.gather(&slots)
    }

    fn sample_prioritized(
        &mut self,
        batch_size: usize,
        alpha: f32,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError> {
        let priorities = self.priorities()?;
        let slots = draw_prioritized_indices(&priorities, batch_size, alpha, rng)?;
        self.gather(&slots)
    }
}

fn read_meta(conn: &Connection, key: &str) -> Result<Option<usize>, ReplayError> {
    let value: Option<i64> = conn
        .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value.map(|v| v as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn add_n(store: &mut SqliteReplayStore, n: usize) {
        for i in 0..n {
            let v = i as f32;
            store
                .add(vec![v; 4], vec![v; 2], v / 100.0, None)
                .unwrap();
        }
    }

    #[test]
    fn creates_database_and_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");

        let store = SqliteReplayStore::open(path.to_str().unwrap(), 8).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 8);
        assert!(path.exists());
    }

    #[test]
    fn add_and_sample_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");
        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 8).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        add_n(&mut store, 4);
        assert_eq!(store.len(), 4);

        let batch = store.sample(4, &mut rng).unwrap();
        assert_eq!(batch.len(), 4);
        // Sorted slot order is insertion order while the ring is unwrapped.
        assert_eq!(batch[0].state, vec![0.0; 4]);
        assert_eq!(batch[3].state, vec![3.0; 4]);
        assert_eq!(batch[2].policy, vec![2.0; 2]);
    }

    #[test]
    fn cursor_wraps_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");
        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 4).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        add_n(&mut store, 6);
        assert_eq!(store.len(), 4);

        let batch = store.sample(4, &mut rng).unwrap();
        // Slots 0 and 1 now hold entries 4 and 5.
        assert_eq!(batch[0].state, vec![4.0; 4]);
        assert_eq!(batch[1].state, vec![5.0; 4]);
        assert_eq!(batch[2].state, vec![2.0; 4]);
        assert_eq!(batch[3].state, vec![3.0; 4]);
    }

    #[test]
    fn reopen_resumes_cursor_and_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");

        {
            let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 4).unwrap();
            add_n(&mut store, 5);
        }

        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 4).unwrap();
        assert_eq!(store.len(), 4);

        // One more write lands at slot 1, finishing where the first
        // session's cursor left off.
        store.add(vec![9.0; 4], vec![9.0; 2], 0.0, None).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let batch = store.sample(4, &mut rng).unwrap();
        assert_eq!(batch[0].state, vec![4.0; 4]);
        assert_eq!(batch[1].state, vec![9.0; 4]);
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");
        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 10).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        add_n(&mut store, 3);
        let err = store.sample(4, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::BatchTooLarge {
                requested: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn prioritized_sampling_reads_persisted_priorities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");
        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 4).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![1.0], vec![0.0], 0.0, Some(100.0)).unwrap();

        // Repeats of the heavy entry in a full-size batch show the draw
        // is with replacement.
        let batch = store.sample_prioritized(4, 1.0, &mut rng).unwrap();
        assert_eq!(batch.len(), 4);
        let heavy = batch.iter().filter(|e| e.state[0] == 1.0).count();
        assert!(heavy >= 3, "heavy entry drawn {heavy}/4 times");
    }

    #[test]
    fn prioritized_sampling_rejects_oversized_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");
        let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 10).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        add_n(&mut store, 5);
        let err = store.sample_prioritized(6, 0.6, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::BatchTooLarge {
                requested: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");

        let err = SqliteReplayStore::open(path.to_str().unwrap(), 0).unwrap_err();
        assert!(matches!(err, ReplayError::ZeroCapacity));
    }

    #[test]
    fn reopening_with_smaller_capacity_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.db");

        {
            let mut store = SqliteReplayStore::open(path.to_str().unwrap(), 4).unwrap();
            add_n(&mut store, 3);
        }

        let err = SqliteReplayStore::open(path.to_str().unwrap(), 2).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::CapacityMismatch {
                cursor: 3,
                size: 3,
                capacity: 2
            }
        ));
    }
}
