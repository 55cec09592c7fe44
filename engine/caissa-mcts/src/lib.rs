//! PUCT Monte Carlo Tree Search for AlphaZero-style self-play.
//!
//! Game-agnostic over the [`caissa_core::Game`] trait. Each search runs a
//! configured number of simulations, every simulation passing through four
//! phases:
//!
//! 1. **Selection**: descend from the root by PUCT score
//!    (`Q + c_puct * P * sqrt(N_total) / (1 + N)`)
//! 2. **Expansion**: assign network priors to the leaf's legal moves
//! 3. **Evaluation**: policy/value from an [`Evaluator`], with terminal
//!    positions short-circuited to their exact game result
//! 4. **Backup**: propagate the value along the descent path, flipping
//!    sign each ply (zero-sum, alternating perspective)
//!
//! Root priors are perturbed once per search with Dirichlet noise so
//! self-play explores; evaluation mode turns the noise off via
//! [`SearchConfig::for_evaluation`]. Transpositions inside one search share
//! a single evaluator call through [`EvalCache`].
//!
//! ```rust,ignore
//! use caissa_mcts::{MctsEngine, SearchConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let evaluator = UniformEvaluator::new();
//! let engine = MctsEngine::new(&evaluator, SearchConfig::for_training());
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! // Visit counts keyed by action index; empty if the game is over.
//! let visits = engine.run(&state, &mut rng)?;
//! ```

pub mod cache;
pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

pub use cache::EvalCache;
pub use config::SearchConfig;
pub use evaluator::{Evaluation, Evaluator, EvaluatorError, UniformEvaluator};
pub use node::{Edge, Node, NodeId};
pub use search::{MctsEngine, SearchError};
pub use tree::SearchTree;
