//! Evaluator trait for position evaluation.
//!
//! The evaluator provides policy (move probabilities) and value estimates
//! for encoded positions. In AlphaZero this is a neural network; for tests
//! and model-less self-play a uniform evaluator stands in.

use thiserror::Error;

use caissa_core::ACTION_SPACE_SIZE;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("malformed input tensor: {0}")]
    InvalidInput(String),
}

/// Result of evaluating a position.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Probability distribution over the full action space.
    /// Index i is the probability of the move with action index i.
    pub policy: Vec<f32>,

    /// Value estimate for the side to move, in [-1, 1].
    pub value: f32,
}

/// Position evaluator.
///
/// `planes` is the row-major `PLANES x 8 x 8` tensor from
/// [`Game::encode_planes`](caissa_core::Game::encode_planes). The returned
/// policy covers the full action space; the search extracts and renormalizes
/// the legal subset itself. Failures propagate uncaught out of the search.
pub trait Evaluator {
    fn evaluate(&self, planes: &[f32]) -> Result<Evaluation, EvaluatorError>;
}

/// Evaluator with a flat policy and neutral value.
///
/// Drives pure-exploration search for tests and for self-play without a
/// trained model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _planes: &[f32]) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            policy: vec![1.0 / ACTION_SPACE_SIZE as f32; ACTION_SPACE_SIZE],
            value: 0.0,
        })
    }
}
