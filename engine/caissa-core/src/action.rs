//! Dense action-index bijection over (from, to, promotion) triples.
//!
//! Every representable move maps to an integer in `[0, ACTION_SPACE_SIZE)`
//! and back. The mapping makes no legality claim: illegal triples still
//! decode to a syntactically valid [`Move`]. Both directions sit in the
//! per-simulation hot path, so decode goes through a lazily-built table.

use std::sync::OnceLock;

use thiserror::Error;

use crate::{Move, Promotion, NUM_PROMOTIONS, NUM_SQUARES};

/// Width of the policy head: 64 * 64 * 5.
///
/// This single constant fixes the evaluator's output width, the replay
/// buffer's policy-vector width, and the valid decode range.
pub const ACTION_SPACE_SIZE: usize = NUM_SQUARES * NUM_SQUARES * NUM_PROMOTIONS;

/// Errors from action-index decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("action index {index} out of range (action space size {ACTION_SPACE_SIZE})")]
    OutOfRange { index: usize },
}

/// Encode a move as its dense action index.
#[inline]
pub fn encode_move(mv: Move) -> usize {
    ((mv.from as usize * NUM_SQUARES) + mv.to as usize) * NUM_PROMOTIONS + mv.promotion.rank()
}

/// Decode an action index back into a move.
///
/// Fails with [`DecodeError::OutOfRange`] rather than returning a malformed
/// move when the index falls outside the action space.
#[inline]
pub fn decode_move(index: usize) -> Result<Move, DecodeError> {
    decode_table()
        .get(index)
        .copied()
        .ok_or(DecodeError::OutOfRange { index })
}

fn decode_table() -> &'static [Move] {
    static TABLE: OnceLock<Vec<Move>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(ACTION_SPACE_SIZE);
        for from in 0..NUM_SQUARES {
            for to in 0..NUM_SQUARES {
                for rank in 0..NUM_PROMOTIONS {
                    table.push(Move {
                        from: from as u8,
                        to: to as u8,
                        // rank < NUM_PROMOTIONS, so from_rank cannot fail
                        promotion: Promotion::from_rank(rank).unwrap_or(Promotion::None),
                    });
                }
            }
        }
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_reference_arithmetic() {
        let mv = Move::promoting(12, 20, Promotion::Rook);
        // ((12 * 64) + 20) * 5 + 2
        assert_eq!(encode_move(mv), ((12 * 64) + 20) * 5 + 2);

        let quiet = Move::new(0, 8);
        assert_eq!(encode_move(quiet), 8 * 5);
    }

    #[test]
    fn decode_inverts_encode_for_all_triples() {
        for from in 0..64u8 {
            for to in 0..64u8 {
                for rank in 0..NUM_PROMOTIONS {
                    let mv = Move {
                        from,
                        to,
                        promotion: Promotion::from_rank(rank).unwrap(),
                    };
                    assert_eq!(decode_move(encode_move(mv)).unwrap(), mv);
                }
            }
        }
    }

    #[test]
    fn encode_covers_action_space_without_collision() {
        let mut seen = vec![false; ACTION_SPACE_SIZE];
        for from in 0..64u8 {
            for to in 0..64u8 {
                for rank in 0..NUM_PROMOTIONS {
                    let idx = encode_move(Move {
                        from,
                        to,
                        promotion: Promotion::from_rank(rank).unwrap(),
                    });
                    assert!(!seen[idx], "index {idx} produced twice");
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn decode_out_of_range_errors() {
        assert_eq!(
            decode_move(ACTION_SPACE_SIZE),
            Err(DecodeError::OutOfRange {
                index: ACTION_SPACE_SIZE
            })
        );
        assert!(decode_move(usize::MAX).is_err());
        assert!(decode_move(ACTION_SPACE_SIZE - 1).is_ok());
    }

    #[test]
    fn promotion_rank_roundtrip() {
        for rank in 0..NUM_PROMOTIONS {
            assert_eq!(Promotion::from_rank(rank).unwrap().rank(), rank);
        }
        assert_eq!(Promotion::from_rank(NUM_PROMOTIONS), None);
    }
}
