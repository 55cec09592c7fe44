//! Game contract shared by the search engine and the self-play actor.
//!
//! The full rules engine lives outside this workspace; search, self-play,
//! and replay only need the narrow surface below. Implementations keep an
//! immutable-state discipline: [`Game::apply`] returns a new position and
//! never mutates the receiver, so the search tree can hold cheap snapshots.

use crate::Move;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl Outcome {
    /// Game score from White's perspective: +1 / -1 / 0.
    pub fn score(self) -> f32 {
        match self {
            Outcome::WhiteWins => 1.0,
            Outcome::BlackWins => -1.0,
            Outcome::Draw => 0.0,
        }
    }

    /// Score from the given player's perspective.
    pub fn value_for(self, player: Player) -> f32 {
        match player {
            Player::White => self.score(),
            Player::Black => -self.score(),
        }
    }
}

/// Two-player, zero-sum, perfect-information game.
///
/// `Clone` must be cheap enough to run once per node creation; every
/// search node owns its own position snapshot.
pub trait Game: Clone {
    /// Channel count of the encoded observation tensor.
    const PLANES: usize;

    fn side_to_move(&self) -> Player;

    /// All legal moves for the side to move. Empty iff the game is over.
    fn legal_moves(&self) -> Vec<Move>;

    /// Position after playing `mv`. The receiver is left untouched.
    ///
    /// Callers only pass moves drawn from [`legal_moves`](Game::legal_moves);
    /// behavior on illegal moves is implementation-defined.
    fn apply(&self, mv: Move) -> Self;

    /// `Some` once the game has ended, `None` while in progress.
    fn outcome(&self) -> Option<Outcome>;

    /// Position hash covering the board and side to move, independent of
    /// move history. Used to key the per-search evaluation cache, so two
    /// transposed paths to the same position must collide.
    fn fingerprint(&self) -> u64;

    /// Row-major `PLANES x 8 x 8` tensor for the evaluator.
    fn encode_planes(&self) -> Vec<f32>;

    /// Whether `mv` is quiet in this position (no capture, no check, and
    /// the mover is not currently in check). Self-play can filter noisy
    /// positions out of the training stream based on this.
    fn is_quiet(&self, mv: Move) -> bool;
}
