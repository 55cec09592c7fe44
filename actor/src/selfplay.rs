//! Self-play game generation.
//!
//! Plays complete games by running a tree search at every position,
//! converting root visit counts into a policy target, and sampling the move
//! to play. When the game ends, every recorded position is labeled with the
//! final outcome from its own side's perspective.

use std::collections::HashMap;

use caissa_core::{encode_move, Game, Move, Outcome, Player, ACTION_SPACE_SIZE};
use caissa_mcts::{Evaluator, MctsEngine, SearchError};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// How the move to play is chosen from the visit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSelection {
    /// Sample proportionally to the tempered visit counts.
    Stochastic,
    /// Always play the highest-weight move; ties go to the earliest
    /// legal move.
    Argmax,
}

#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Temperature for plies before the threshold. Higher spreads play
    /// across more moves.
    pub temperature: f32,

    /// Temperature once the threshold is passed. Low values lock play onto
    /// the most-visited move while keeping a sliver of exploration.
    pub late_temperature: f32,

    /// Ply index at which the late temperature takes over. Zero disables
    /// the schedule and uses `temperature` throughout.
    pub temperature_threshold: u32,

    pub move_selection: MoveSelection,

    /// When set, positions whose chosen move is a capture are not recorded.
    /// The move is still played.
    pub filter_quiet: bool,

    /// Unfinished games are cut off here and labeled as draws.
    pub max_plies: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            late_temperature: 0.1,
            temperature_threshold: 30,
            move_selection: MoveSelection::Stochastic,
            filter_quiet: false,
            max_plies: 200,
        }
    }
}

/// One labeled training position produced by self-play.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    /// Encoded planes of the position, before the chosen move.
    pub state: Vec<f32>,

    /// Normalized tempered visit counts over the full action space.
    pub policy: Vec<f32>,

    /// Final outcome from the recorded side's perspective: +1 win, -1
    /// loss, 0 draw.
    pub value: f32,
}

/// Plays games of `G` against itself with a shared search engine.
pub struct SelfPlayGenerator<'a, E: Evaluator> {
    engine: MctsEngine<'a, E>,
    config: SelfPlayConfig,
}

impl<'a, E: Evaluator> SelfPlayGenerator<'a, E> {
    pub fn new(engine: MctsEngine<'a, E>, config: SelfPlayConfig) -> Self {
        Self { engine, config }
    }

    /// Play one game from `start` to completion and return the labeled
    /// positions in ply order.
    pub fn play_game<G: Game>(
        &self,
        start: &G,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<TrainingExample>, SelfPlayError> {
        let mut state = start.clone();
        let mut plies: u32 = 0;
        let mut records: Vec<(Vec<f32>, Vec<f32>, Player)> = Vec::new();

        let outcome = loop {
            if let Some(outcome) = state.outcome() {
                break outcome;
            }
            if plies >= self.config.max_plies {
                debug!(plies, "ply limit reached, scoring as a draw");
                break Outcome::Draw;
            }

            let counts = self.engine.run(&state, rng)?;
            let pi = visit_policy(&counts, self.temperature_at(plies));
            let Some(mv) = self.select_move(&state, &pi, rng) else {
                break Outcome::Draw;
            };

            if !self.config.filter_quiet || state.is_quiet(mv) {
                records.push((state.encode_planes(), pi, state.side_to_move()));
            } else {
                trace!(ply = plies, %mv, "not recording tactical position");
            }

            state = state.apply(mv);
            plies += 1;
        };

        let score = outcome.score();
        debug!(plies, examples = records.len(), score, "game finished");

        Ok(records
            .into_iter()
            .map(|(state, policy, side)| TrainingExample {
                state,
                policy,
                value: if side == Player::White { score } else { -score },
            })
            .collect())
    }

    fn temperature_at(&self, ply: u32) -> f32 {
        if self.config.temperature_threshold > 0 && ply >= self.config.temperature_threshold {
            self.config.late_temperature
        } else {
            self.config.temperature
        }
    }

    fn select_move<G: Game>(
        &self,
        state: &G,
        pi: &[f32],
        rng: &mut ChaCha20Rng,
    ) -> Option<Move> {
        let legal = state.legal_moves();
        let weights: Vec<f32> = legal.iter().map(|&mv| pi[encode_move(mv)]).collect();

        match self.config.move_selection {
            MoveSelection::Argmax => {
                let mut best = None;
                let mut best_weight = f32::NEG_INFINITY;
                for (i, &w) in weights.iter().enumerate() {
                    if w > best_weight {
                        best = Some(i);
                        best_weight = w;
                    }
                }
                best.and_then(|i| legal.get(i).copied())
            }
            MoveSelection::Stochastic => {
                let total: f32 = weights.iter().sum();
                if total <= 0.0 {
                    return legal.first().copied();
                }
                let mut remaining = rng.gen::<f32>() * total;
                for (i, &w) in weights.iter().enumerate() {
                    remaining -= w;
                    if remaining <= 0.0 {
                        return legal.get(i).copied();
                    }
                }
                legal.last().copied()
            }
        }
    }
}

/// Normalized policy over the full action space with `pi[a] ∝ N(a)^(1/T)`.
///
/// Counts are scaled by the maximum before exponentiation so that extreme
/// temperatures cannot overflow.
fn visit_policy(counts: &HashMap<usize, u32>, temperature: f32) -> Vec<f32> {
    let mut pi = vec![0.0f32; ACTION_SPACE_SIZE];
    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return pi;
    }

    for (&index, &visits) in counts {
        pi[index] = (visits as f32 / max as f32).powf(1.0 / temperature);
    }
    let total: f32 = pi.iter().sum();
    for p in &mut pi {
        *p /= total;
    }
    pi
}
