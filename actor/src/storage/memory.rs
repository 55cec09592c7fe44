//! In-memory replay ring.

use rand_chacha::ChaCha20Rng;

use super::{
    draw_prioritized_indices, draw_uniform_indices, effective_priority, ReplayEntry, ReplayError,
    ReplayStore,
};

/// Vec-backed replay ring. Fast and process-local; contents are lost on
/// exit. Use [`super::SqliteReplayStore`] when the buffer must outlive the
/// run.
#[derive(Debug)]
pub struct MemoryReplayStore {
    entries: Vec<ReplayEntry>,
    capacity: usize,
    /// Next slot to write, in [0, capacity).
    cursor: usize,
}

impl MemoryReplayStore {
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        Ok(Self {
            entries: Vec::with_capacity(capacity.min(1024)),
            capacity,
            cursor: 0,
        })
    }

    fn gather(&self, indices: &[usize]) -> Vec<ReplayEntry> {
        indices.iter().map(|&i| self.entries[i].clone()).collect()
    }
}

impl ReplayStore for MemoryReplayStore {
    fn add(
        &mut self,
        state: Vec<f32>,
        policy: Vec<f32>,
        value: f32,
        priority: Option<f32>,
    ) -> Result<(), ReplayError> {
        let entry = ReplayEntry {
            state,
            policy,
            value,
            priority: effective_priority(value, priority),
        };

        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.cursor] = entry;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn sample(
        &mut self,
        batch_size: usize,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError> {
        let indices = draw_uniform_indices(self.entries.len(), batch_size, rng)?;
        Ok(self.gather(&indices))
    }

    fn sample_prioritized(
        &mut self,
        batch_size: usize,
        alpha: f32,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError> {
        let priorities: Vec<f32> = self.entries.iter().map(|e| e.priority).collect();
        let indices = draw_prioritized_indices(&priorities, batch_size, alpha, rng)?;
        Ok(self.gather(&indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn add_n(store: &mut MemoryReplayStore, n: usize) {
        for i in 0..n {
            let v = i as f32;
            store
                .add(vec![v; 4], vec![v; 2], v / 100.0, None)
                .unwrap();
        }
    }

    #[test]
    fn fills_up_to_capacity() {
        let mut store = MemoryReplayStore::new(10).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 10);

        add_n(&mut store, 5);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn overwrites_oldest_once_full() {
        let mut store = MemoryReplayStore::new(4).unwrap();
        add_n(&mut store, 6);

        // Slots 0 and 1 were reclaimed by entries 4 and 5.
        assert_eq!(store.len(), 4);
        assert_eq!(store.entries[0].state, vec![4.0; 4]);
        assert_eq!(store.entries[1].state, vec![5.0; 4]);
        assert_eq!(store.entries[2].state, vec![2.0; 4]);
        assert_eq!(store.entries[3].state, vec![3.0; 4]);
        assert_eq!(store.cursor, 2);
    }

    #[test]
    fn sample_respects_size_not_capacity() {
        let mut store = MemoryReplayStore::new(10).unwrap();
        add_n(&mut store, 5);
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let batch = store.sample(3, &mut rng).unwrap();
        assert_eq!(batch.len(), 3);

        let err = store.sample(6, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::BatchTooLarge {
                requested: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn sampled_batch_has_distinct_entries() {
        let mut store = MemoryReplayStore::new(8).unwrap();
        add_n(&mut store, 8);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let batch = store.sample(8, &mut rng).unwrap();
        let mut states: Vec<f32> = batch.iter().map(|e| e.state[0]).collect();
        states.sort_by(f32::total_cmp);
        states.dedup();
        assert_eq!(states.len(), 8);
    }

    #[test]
    fn prioritized_sampling_draws_with_replacement() {
        let mut store = MemoryReplayStore::new(4).unwrap();
        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![0.0], vec![0.0], 0.0, Some(1e-6)).unwrap();
        store.add(vec![1.0], vec![0.0], 0.0, Some(100.0)).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        // The heavy entry repeating within a full-size batch shows the
        // draw is with replacement.
        let batch = store.sample_prioritized(4, 1.0, &mut rng).unwrap();
        assert_eq!(batch.len(), 4);
        let heavy = batch.iter().filter(|e| e.state[0] == 1.0).count();
        assert!(heavy >= 3, "heavy entry drawn {heavy}/4 times");
    }

    #[test]
    fn prioritized_sampling_rejects_oversized_batch() {
        let mut store = MemoryReplayStore::new(10).unwrap();
        add_n(&mut store, 5);
        let mut rng = ChaCha20Rng::seed_from_u64(42);

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
        let err = MemoryReplayStore::new(0).unwrap_err();
        assert!(matches!(err, ReplayError::ZeroCapacity));
    }

    #[test]
    fn explicit_priority_overrides_default() {
        let mut store = MemoryReplayStore::new(2).unwrap();
        store.add(vec![0.0], vec![0.0], -0.8, None).unwrap();
        store.add(vec![0.0], vec![0.0], -0.8, Some(2.5)).unwrap();

        assert!((store.entries[0].priority - (0.8 + super::super::PRIORITY_EPSILON)).abs() < 1e-6);
        assert!((store.entries[1].priority - 2.5).abs() < 1e-6);
    }
}
