//! Per-search evaluation cache.
//!
//! Memoizes evaluator calls on the position fingerprint so transpositions
//! reached by different move orders within one search cost a single network
//! call. The cache lives for exactly one `run()` and is dropped at return,
//! so staleness across model updates is impossible.

use std::collections::HashMap;

use caissa_core::Game;

use crate::evaluator::{Evaluation, Evaluator, EvaluatorError};

#[derive(Debug, Default)]
pub struct EvalCache {
    entries: HashMap<u64, Evaluation>,
    hits: u64,
    lookups: u64,
}

impl EvalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `state`, reusing a cached result when its fingerprint has
    /// been seen before. Evaluator errors pass through without inserting.
    pub fn evaluate<G: Game, E: Evaluator>(
        &mut self,
        state: &G,
        evaluator: &E,
    ) -> Result<Evaluation, EvaluatorError> {
        self.lookups += 1;
        let key = state.fingerprint();

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(cached.clone());
        }

        let eval = evaluator.evaluate(&state.encode_planes())?;
        self.entries.insert(key, eval.clone());
        Ok(eval)
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Total lookups, hits and misses both.
    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    /// Number of distinct positions evaluated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
