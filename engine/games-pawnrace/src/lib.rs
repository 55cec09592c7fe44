//! Pawn race: a minimal chess-like game for driving the search stack.
//!
//! Eight pawns per side on their home ranks. Pawns push one square forward
//! and capture diagonally; a push to the last rank promotes (all four
//! promotion pieces are offered as distinct moves) and immediately wins.
//! A side to move with no legal moves draws the game.
//!
//! Small enough to reason about in tests, yet its promotions exercise the
//! full (from, to, promotion) action encoding the way real chess would.

use caissa_core::{Game, Move, Outcome, Player, Promotion, Square};

const RANK_1: u64 = 0xFF;
const RANK_2: u64 = 0xFF << 8;
const RANK_7: u64 = 0xFF << 48;
const RANK_8: u64 = 0xFF << 56;

const PROMOTION_PIECES: [Promotion; 4] = [
    Promotion::Queen,
    Promotion::Rook,
    Promotion::Bishop,
    Promotion::Knight,
];

/// Pawn race position: two pawn bitboards plus the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PawnRace {
    white: u64,
    black: u64,
    side: Player,
}

impl PawnRace {
    /// Starting position: eight pawns per side on ranks 2 and 7.
    pub fn new() -> Self {
        Self {
            white: RANK_2,
            black: RANK_7,
            side: Player::White,
        }
    }

    /// Arbitrary position from raw bitboards. Callers are responsible for
    /// keeping the two boards disjoint.
    pub fn from_bitboards(white: u64, black: u64, side: Player) -> Self {
        Self { white, black, side }
    }

    pub fn white_pawns(&self) -> u64 {
        self.white
    }

    pub fn black_pawns(&self) -> u64 {
        self.black
    }

    fn occupied(&self) -> u64 {
        self.white | self.black
    }

    fn promoted(&self) -> Option<Player> {
        if self.white & RANK_8 != 0 {
            Some(Player::White)
        } else if self.black & RANK_1 != 0 {
            Some(Player::Black)
        } else {
            None
        }
    }

    /// Push `mv` (and its promotion variants when `to` is the last rank)
    /// onto `moves`.
    fn push_move(&self, moves: &mut Vec<Move>, from: Square, to: Square) {
        let last_rank = match self.side {
            Player::White => to >= 56,
            Player::Black => to < 8,
        };
        if last_rank {
            for piece in PROMOTION_PIECES {
                moves.push(Move::promoting(from, to, piece));
            }
        } else {
            moves.push(Move::new(from, to));
        }
    }

    fn generate_moves(&self) -> Vec<Move> {
        let (own, theirs) = match self.side {
            Player::White => (self.white, self.black),
            Player::Black => (self.black, self.white),
        };
        let occupied = self.occupied();

        let mut moves = Vec::new();
        for from in 0..64u8 {
            if own & (1 << from) == 0 {
                continue;
            }
            let file = from % 8;

            match self.side {
                Player::White => {
                    if occupied & (1 << (from + 8)) == 0 {
                        self.push_move(&mut moves, from, from + 8);
                    }
                    if file > 0 && theirs & (1 << (from + 7)) != 0 {
                        self.push_move(&mut moves, from, from + 7);
                    }
                    if file < 7 && theirs & (1 << (from + 9)) != 0 {
                        self.push_move(&mut moves, from, from + 9);
                    }
                }
                Player::Black => {
                    if occupied & (1 << (from - 8)) == 0 {
                        self.push_move(&mut moves, from, from - 8);
                    }
                    if file > 0 && theirs & (1 << (from - 9)) != 0 {
                        self.push_move(&mut moves, from, from - 9);
                    }
                    if file < 7 && theirs & (1 << (from - 7)) != 0 {
                        self.push_move(&mut moves, from, from - 7);
                    }
                }
            }
        }
        moves
    }
}

impl Default for PawnRace {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for PawnRace {
    const PLANES: usize = 3;

    fn side_to_move(&self) -> Player {
        self.side
    }

    fn legal_moves(&self) -> Vec<Move> {
        if self.promoted().is_some() {
            return Vec::new();
        }
        self.generate_moves()
    }

    fn apply(&self, mv: Move) -> Self {
        let mut next = *self;
        let from_bit = 1u64 << mv.from;
        let to_bit = 1u64 << mv.to;

        match self.side {
            Player::White => {
                next.white = (next.white & !from_bit) | to_bit;
                next.black &= !to_bit;
            }
            Player::Black => {
                next.black = (next.black & !from_bit) | to_bit;
                next.white &= !to_bit;
            }
        }
        next.side = self.side.opponent();
        next
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.promoted() {
            Some(Player::White) => Some(Outcome::WhiteWins),
            Some(Player::Black) => Some(Outcome::BlackWins),
            None if self.generate_moves().is_empty() => Some(Outcome::Draw),
            None => None,
        }
    }

    // FNV-1a over the two bitboards and the side to move. History-free,
    // so transposed move orders collide as the cache requires.
    fn fingerprint(&self) -> u64 {
        let side = match self.side {
            Player::White => 0u64,
            Player::Black => 1u64,
        };
        let mut hash = 0xcbf2_9ce4_8422_2325u64;
        for word in [self.white, self.black, side] {
            for byte in word.to_le_bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        hash
    }

    fn encode_planes(&self) -> Vec<f32> {
        let mut planes = vec![0.0; Self::PLANES * 64];
        for sq in 0..64 {
            if self.white & (1 << sq) != 0 {
                planes[sq] = 1.0;
            }
            if self.black & (1 << sq) != 0 {
                planes[64 + sq] = 1.0;
            }
        }
        if self.side == Player::White {
            for slot in &mut planes[128..] {
                *slot = 1.0;
            }
        }
        planes
    }

    fn is_quiet(&self, mv: Move) -> bool {
        let theirs = match self.side {
            Player::White => self.black,
            Player::Black => self.white,
        };
        theirs & (1u64 << mv.to) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_has_eight_pushes() {
        let state = PawnRace::new();
        let moves = state.legal_moves();

        assert_eq!(moves.len(), 8);
        for mv in &moves {
            assert_eq!(mv.to, mv.from + 8);
            assert_eq!(mv.promotion, Promotion::None);
            assert!(state.is_quiet(*mv));
        }
        assert!(state.outcome().is_none());
        assert_eq!(state.side_to_move(), Player::White);
    }

    #[test]
    fn apply_is_immutable_and_switches_sides() {
        let state = PawnRace::new();
        let next = state.apply(Move::new(8, 16));

        assert_eq!(state, PawnRace::new());
        assert_eq!(next.side_to_move(), Player::Black);
        assert_eq!(next.white_pawns(), (RANK_2 & !(1 << 8)) | (1 << 16));
    }

    #[test]
    fn diagonal_captures_are_generated_and_not_quiet() {
        // White pawn d4 (27), black pawns c5 (34) and e5 (36).
        let state = PawnRace::from_bitboards(1 << 27, (1 << 34) | (1 << 36), Player::White);
        let moves = state.legal_moves();

        // Push d5 plus two captures.
        assert_eq!(moves.len(), 3);
        assert!(moves.contains(&Move::new(27, 35)));
        assert!(moves.contains(&Move::new(27, 34)));
        assert!(moves.contains(&Move::new(27, 36)));

        assert!(state.is_quiet(Move::new(27, 35)));
        assert!(!state.is_quiet(Move::new(27, 34)));
        assert!(!state.is_quiet(Move::new(27, 36)));

        let captured = state.apply(Move::new(27, 34));
        assert_eq!(captured.black_pawns(), 1 << 36);
        assert_eq!(captured.white_pawns(), 1 << 34);
    }

    #[test]
    fn file_edges_do_not_wrap() {
        // White pawn a4 (24), black pawn h5 (39): the "capture" from a4
        // to h5 would wrap the board and must not be generated.
        let state = PawnRace::from_bitboards(1 << 24, 1 << 39, Player::White);
        let moves = state.legal_moves();

        assert_eq!(moves, vec![Move::new(24, 32)]);
    }

    #[test]
    fn promotion_moves_carry_all_four_pieces() {
        // White pawn on b7 (49), nothing else.
        let state = PawnRace::from_bitboards(1 << 49, 1 << 8, Player::White);
        let moves = state.legal_moves();

        assert_eq!(moves.len(), 4);
        for (mv, piece) in moves.iter().zip(PROMOTION_PIECES) {
            assert_eq!(mv.from, 49);
            assert_eq!(mv.to, 57);
            assert_eq!(mv.promotion, piece);
        }
    }

    #[test]
    fn promotion_ends_the_game() {
        let state = PawnRace::from_bitboards(1 << 49, 1 << 8, Player::White);
        let done = state.apply(Move::promoting(49, 57, Promotion::Queen));

        assert_eq!(done.outcome(), Some(Outcome::WhiteWins));
        assert!(done.legal_moves().is_empty());

        // Black promotion mirrors.
        let state = PawnRace::from_bitboards(1 << 49, 1 << 9, Player::Black);
        let done = state.apply(Move::promoting(9, 1, Promotion::Knight));
        assert_eq!(done.outcome(), Some(Outcome::BlackWins));
    }

    #[test]
    fn blocked_side_draws() {
        // Pawns face off on one file: d4 (27) vs d5 (35). Neither push nor
        // capture exists for the side to move.
        let state = PawnRace::from_bitboards(1 << 27, 1 << 35, Player::White);
        assert!(state.legal_moves().is_empty());
        assert_eq!(state.outcome(), Some(Outcome::Draw));

        let black_view = PawnRace::from_bitboards(1 << 27, 1 << 35, Player::Black);
        assert_eq!(black_view.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn no_pawns_left_is_a_draw() {
        let state = PawnRace::from_bitboards(1 << 20, 0, Player::Black);
        assert_eq!(state.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn fingerprint_collapses_transpositions() {
        let a = PawnRace::new()
            .apply(Move::new(8, 16))
            .apply(Move::new(54, 46))
            .apply(Move::new(9, 17));
        let b = PawnRace::new()
            .apply(Move::new(9, 17))
            .apply(Move::new(54, 46))
            .apply(Move::new(8, 16));

        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());

        // Side to move is part of the key.
        let white_view = PawnRace::from_bitboards(a.white_pawns(), a.black_pawns(), Player::White);
        assert_ne!(a.fingerprint(), white_view.fingerprint());
    }

    #[test]
    fn planes_encode_boards_and_side() {
        let state = PawnRace::new();
        let planes = state.encode_planes();

        assert_eq!(planes.len(), PawnRace::PLANES * 64);
        assert_eq!(planes[8..16], [1.0; 8]);
        assert_eq!(planes[64 + 48..64 + 56], [1.0; 8]);
        assert!(planes[128..].iter().all(|&x| x == 1.0));

        let black_turn = state.apply(Move::new(8, 16));
        assert!(black_turn.encode_planes()[128..].iter().all(|&x| x == 0.0));
    }
}
