//! Game-record data model.

use tenuki_core::{Move, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: Player,
    pub mv: Move,
}

/// A linear game record: board size, komi, and the move sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct GameTree {
    pub board_size: usize,
    pub komi: f64,
    pub moves: Vec<MoveRecord>,
}

impl Default for GameTree {
    fn default() -> Self {
        Self {
            board_size: 19,
            komi: 7.5,
            moves: Vec::new(),
        }
    }
}
