//! PUCT search engine.
//!
//! Each `run()` builds a fresh tree from the root position and runs the
//! standard four-phase loop:
//! 1. Selection: descend by PUCT score, recording the (node, edge) path
//! 2. Expansion: assign priors to the leaf's legal moves
//! 3. Evaluation: network value at the leaf, terminal value at game end
//! 4. Backup: update N/W along the recorded path, flipping sign per ply
//!
//! The tree and the evaluation cache are both discarded when `run()`
//! returns; nothing is reused across plies.

use std::collections::HashMap;

use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Gamma};
use thiserror::Error;
use tracing::{debug, trace};

use caissa_core::{encode_move, Game};

use crate::cache::EvalCache;
use crate::config::SearchConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::{Node, NodeId};
use crate::tree::SearchTree;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),
}

/// PUCT Monte Carlo Tree Search driven by an external evaluator.
pub struct MctsEngine<'a, E: Evaluator> {
    evaluator: &'a E,
    config: SearchConfig,
}

impl<'a, E: Evaluator> MctsEngine<'a, E> {
    pub fn new(evaluator: &'a E, config: SearchConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the configured number of simulations from `root_state` and
    /// return each root move's visit count, keyed by action index.
    ///
    /// A root with no legal moves (checkmate/stalemate) yields an empty
    /// map. Evaluator failures abort the search; any simulation in flight
    /// leaves no statistics behind (the path is updated only after its
    /// evaluation succeeds).
    pub fn run<G: Game>(
        &self,
        root_state: &G,
        rng: &mut ChaCha20Rng,
    ) -> Result<HashMap<usize, u32>, SearchError> {
        let legal_moves = root_state.legal_moves();
        if legal_moves.is_empty() {
            debug!("root position is terminal, returning empty visit map");
            return Ok(HashMap::new());
        }

        let mut tree = SearchTree::new(root_state.clone());
        let mut cache = EvalCache::new();

        let root_eval = cache.evaluate(root_state, self.evaluator)?;
        tree.get_mut(tree.root()).expand(&root_eval.policy, legal_moves);

        if self.config.dirichlet_alpha > 0.0 && self.config.dirichlet_epsilon > 0.0 {
            self.add_root_noise(&mut tree, rng);
        }

        for _ in 0..self.config.num_simulations {
            self.simulate(&mut tree, &mut cache, rng)?;
        }

        debug!(
            nodes = tree.len(),
            evaluations = cache.len(),
            cache_hits = cache.hits(),
            cache_lookups = cache.lookups(),
            "search complete"
        );

        let root = tree.get(tree.root());
        Ok(root
            .edges
            .iter()
            .map(|edge| (encode_move(edge.mv), edge.visits))
            .collect())
    }

    /// One simulation: select to a leaf, evaluate it, back the value up.
    fn simulate<G: Game>(
        &self,
        tree: &mut SearchTree<G>,
        cache: &mut EvalCache,
        _rng: &mut ChaCha20Rng,
    ) -> Result<(), SearchError> {
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut current = tree.root();

        // Selection: descend while the node has assigned priors and at
        // least one move. Children materialize on first traversal by
        // cloning the parent position and applying the move.
        loop {
            let node = tree.get(current);
            if !node.expanded || node.edges.is_empty() {
                break;
            }
            let edge_idx = match node.select(self.config.c_puct) {
                Some(i) => i,
                None => break,
            };

            let child = match node.edges[edge_idx].child {
                Some(child) => child,
                None => {
                    let next = node.state.apply(node.edges[edge_idx].mv);
                    let child = tree.allocate(Node::new(next));
                    tree.get_mut(current).edges[edge_idx].child = Some(child);
                    child
                }
            };

            path.push((current, edge_idx));
            current = child;
        }

        // Evaluation. A finished game takes its exact result instead of a
        // network call; the empty expansion marks it so later visits skip
        // the evaluator too. No statistic is touched before this point, so
        // an evaluator error leaves every N/W as it was.
        let leaf = tree.get(current);
        let value = match leaf.state.outcome() {
            Some(outcome) => {
                let v = outcome.value_for(leaf.state.side_to_move());
                if !leaf.expanded {
                    tree.get_mut(current).expand(&[], Vec::new());
                }
                v
            }
            None => {
                let eval = cache.evaluate(&leaf.state, self.evaluator)?;
                let legal_moves = leaf.state.legal_moves();
                tree.get_mut(current).expand(&eval.policy, legal_moves);
                eval.value
            }
        };

        // Backup: alternating-perspective zero-sum update along the path.
        let mut v = value;
        for &(node_id, edge_idx) in path.iter().rev() {
            let edge = &mut tree.get_mut(node_id).edges[edge_idx];
            edge.visits += 1;
            edge.value_sum += v;
            v = -v;
        }

        trace!(
            depth = path.len(),
            leaf = current.0,
            value,
            "simulation complete"
        );

        Ok(())
    }

    /// Mix Dirichlet noise into the root priors: `(1-eps)*P + eps*noise`,
    /// over exactly the root's legal moves. Applied once per `run()`.
    fn add_root_noise<G: Game>(&self, tree: &mut SearchTree<G>, rng: &mut ChaCha20Rng) {
        let root_id = tree.root();
        let n = tree.get(root_id).edges.len();
        if n == 0 {
            return;
        }

        let noise = dirichlet_noise(n, self.config.dirichlet_alpha, rng);
        let eps = self.config.dirichlet_epsilon;

        for (edge, noise_i) in tree.get_mut(root_id).edges.iter_mut().zip(noise) {
            edge.prior = (1.0 - eps) * edge.prior + eps * noise_i;
        }
    }
}

/// Dirichlet(alpha) sample of length `n` via normalized Gamma variates.
fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Vec<f32> {
    // alpha > 0 is checked by the caller, so Gamma::new cannot fail; fall
    // back to a flat sample rather than unwrap.
    let mut samples: Vec<f32> = match Gamma::new(alpha as f64, 1.0) {
        Ok(gamma) => (0..n).map(|_| gamma.sample(rng) as f32).collect(),
        Err(_) => vec![1.0; n],
    };

    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    }

    samples
}
