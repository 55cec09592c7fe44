//! Shared game contract and move encoding for the caissa engine.
//!
//! This crate defines the types the search and self-play layers are generic
//! over: the [`Move`] representation with its dense action-index bijection,
//! and the [`Game`] trait implemented by rules engines (a full chess engine
//! in production, `games-pawnrace` in tests).

pub mod action;
pub mod game;

pub use action::{decode_move, encode_move, DecodeError, ACTION_SPACE_SIZE};
pub use game::{Game, Outcome, Player};

/// Board square index, rank-major: a1 = 0, h1 = 7, a8 = 56.
pub type Square = u8;

/// Number of squares on the board.
pub const NUM_SQUARES: usize = 64;

/// Promotion piece attached to a move.
///
/// The order of the variants is load-bearing: [`Promotion::rank`] is the
/// position in this list and feeds the action-index arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    None,
    Queen,
    Rook,
    Bishop,
    Knight,
}

/// Number of promotion kinds, including `None`.
pub const NUM_PROMOTIONS: usize = 5;

impl Promotion {
    /// Position of this kind in the fixed promotion order.
    #[inline]
    pub fn rank(self) -> usize {
        match self {
            Promotion::None => 0,
            Promotion::Queen => 1,
            Promotion::Rook => 2,
            Promotion::Bishop => 3,
            Promotion::Knight => 4,
        }
    }

    /// Inverse of [`Promotion::rank`].
    #[inline]
    pub fn from_rank(rank: usize) -> Option<Promotion> {
        match rank {
            0 => Some(Promotion::None),
            1 => Some(Promotion::Queen),
            2 => Some(Promotion::Rook),
            3 => Some(Promotion::Bishop),
            4 => Some(Promotion::Knight),
            _ => None,
        }
    }
}

/// A move in (from, to, promotion) form.
///
/// Purely syntactic: any combination of squares and promotion kind is
/// representable, legality is the rules engine's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Promotion,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: Promotion::None,
        }
    }

    pub fn promoting(from: Square, to: Square, promotion: Promotion) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sq = |s: Square| {
            let file = (b'a' + s % 8) as char;
            let rank = (b'1' + s / 8) as char;
            format!("{file}{rank}")
        };
        let promo = match self.promotion {
            Promotion::None => "",
            Promotion::Queen => "q",
            Promotion::Rook => "r",
            Promotion::Bishop => "b",
            Promotion::Knight => "n",
        };
        write!(f, "{}{}{}", sq(self.from), sq(self.to), promo)
    }
}
