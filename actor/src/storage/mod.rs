//! Replay buffer storage backends.
//!
//! A replay store is a fixed-capacity ring of training examples: once full,
//! each write overwrites the oldest surviving entry while the cursor wraps.
//! Two backends share the interface: an in-memory ring for single-session
//! runs and a SQLite-backed ring that survives process restarts.
//!
//! ```rust,ignore
//! use crate::storage::{create_replay_store, ReplayStore};
//!
//! let mut store = create_replay_store(&config)?;
//! store.add(state, policy, value, None)?;
//! let batch = store.sample(32, &mut rng)?;
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryReplayStore;
pub use sqlite::SqliteReplayStore;

use rand::distributions::{Distribution, WeightedIndex};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::config::Config;

/// Floor added to `|value|` for the default priority, so zero-value draws
/// stay sampleable under prioritization.
pub const PRIORITY_EPSILON: f32 = 1e-5;

/// Errors from replay storage.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A sample request larger than the current buffer size never
    /// truncates; it fails.
    #[error("requested batch of {requested} but only {available} entries are stored")]
    BatchTooLarge { requested: usize, available: usize },

    #[error("prioritized sampling failed: {0}")]
    Sampling(String),

    #[error("replay capacity must be greater than 0")]
    ZeroCapacity,

    /// An existing database was reopened with a capacity too small for
    /// its persisted ring state.
    #[error("stored ring (cursor {cursor}, size {size}) does not fit capacity {capacity}")]
    CapacityMismatch {
        cursor: usize,
        size: usize,
        capacity: usize,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One stored training example. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEntry {
    /// Encoded position planes, row-major.
    pub state: Vec<f32>,

    /// Visit-count policy target over the full action space.
    pub policy: Vec<f32>,

    /// Game outcome from the recorded side's perspective, in [-1, 1].
    pub value: f32,

    /// Sampling priority, >= 0.
    pub priority: f32,
}

/// Fixed-capacity FIFO replay ring with uniform and prioritized sampling.
pub trait ReplayStore {
    /// Write one entry at the cursor, advancing it modulo capacity. Size
    /// saturates at capacity. An omitted priority defaults to
    /// `|value| + PRIORITY_EPSILON`.
    fn add(
        &mut self,
        state: Vec<f32>,
        policy: Vec<f32>,
        value: f32,
        priority: Option<f32>,
    ) -> Result<(), ReplayError>;

    /// Number of entries currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries before FIFO eviction.
    fn capacity(&self) -> usize;

    /// Draw `batch_size` distinct entries uniformly, without replacement.
    /// Fails with [`ReplayError::BatchTooLarge`] if the buffer holds fewer.
    fn sample(
        &mut self,
        batch_size: usize,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError>;

    /// Draw `batch_size` entries with replacement, entry `i` weighted by
    /// `priority[i]^alpha`. Fails with [`ReplayError::BatchTooLarge`] if
    /// the buffer holds fewer than `batch_size` entries.
    fn sample_prioritized(
        &mut self,
        batch_size: usize,
        alpha: f32,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<ReplayEntry>, ReplayError>;
}

/// Choose the storage backend from config: SQLite when a database path is
/// set, in-memory otherwise.
pub fn create_replay_store(config: &Config) -> Result<Box<dyn ReplayStore>, ReplayError> {
    match &config.replay_db_path {
        Some(path) => Ok(Box::new(SqliteReplayStore::open(
            path,
            config.replay_capacity,
        )?)),
        None => Ok(Box::new(MemoryReplayStore::new(config.replay_capacity)?)),
    }
}

pub(crate) fn effective_priority(value: f32, priority: Option<f32>) -> f32 {
    priority.unwrap_or_else(|| value.abs() + PRIORITY_EPSILON)
}

/// `batch_size` distinct indices uniform over `[0, size)`, sorted.
///
/// Sorted output keeps the gather monotonic, which the SQLite read path
/// relies on.
pub(crate) fn draw_uniform_indices(
    size: usize,
    batch_size: usize,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<usize>, ReplayError> {
    if batch_size > size {
        return Err(ReplayError::BatchTooLarge {
            requested: batch_size,
            available: size,
        });
    }

    let mut indices = rand::seq::index::sample(rng, size, batch_size).into_vec();
    indices.sort_unstable();
    Ok(indices)
}

/// `batch_size` indices drawn with replacement, index `i` weighted by
/// `priorities[i]^alpha`, sorted. A batch larger than the number of
/// entries is rejected, same as the uniform path.
pub(crate) fn draw_prioritized_indices(
    priorities: &[f32],
    batch_size: usize,
    alpha: f32,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<usize>, ReplayError> {
    if batch_size > priorities.len() {
        return Err(ReplayError::BatchTooLarge {
            requested: batch_size,
            available: priorities.len(),
        });
    }
    if priorities.is_empty() {
        return Ok(Vec::new());
    }

    let weights: Vec<f32> = priorities.iter().map(|p| p.powf(alpha)).collect();
    let dist = WeightedIndex::new(&weights).map_err(|e| ReplayError::Sampling(e.to_string()))?;

    let mut indices: Vec<usize> = (0..batch_size).map(|_| dist.sample(rng)).collect();
    indices.sort_unstable();
    Ok(indices)
}

/// f32 slice to little-endian bytes, the on-disk vector encoding.
pub(crate) fn encode_f32s(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn decode_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
