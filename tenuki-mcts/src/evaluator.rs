//! Policy/value oracle contract and the uniform reference implementation.

use tenuki_core::{Board, Player};

/// Output of one evaluation: unnormalized non-negative policy weights over
/// every vertex plus a trailing Pass entry, and a value in `[-1, 1]` from
/// the perspective of the player to move.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub policy: Vec<f32>,
    pub value: f32,
}

/// A position oracle. Implementations must be pure with respect to the
/// passed board; the search calls this concurrently from worker threads.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board, to_play: Player) -> Evaluation;
}

/// Reference evaluator: uniform policy over all moves, neutral value.
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, board: &Board, _to_play: Player) -> Evaluation {
        let total_moves = board.board_size() * board.board_size() + 1;
        Evaluation {
            policy: vec![1.0 / total_moves as f32; total_moves],
            value: 0.0,
        }
    }
}
