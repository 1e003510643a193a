//! Immutable per-game rules configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported square board edge.
pub const MAX_BOARD_SIZE: usize = 25;

/// Which repetitions of a position are forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KoRule {
    /// Only the immediate single-stone recapture is forbidden.
    SimpleKo,
    /// Any whole-board repetition of a previous position is forbidden.
    PositionalSuperko,
}

/// How a finished game is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Stones plus strictly-owned empty regions, komi to White.
    TrompTaylorArea,
    /// Declared but not implemented; selecting it surfaces an error at
    /// scoring time.
    Territory,
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("board size must be in 1..={MAX_BOARD_SIZE}, got {0}")]
    InvalidBoardSize(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub board_size: usize,
    pub komi: f64,
    pub allow_suicide: bool,
    pub ko_rule: KoRule,
    pub scoring_rule: ScoringRule,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: 19,
            komi: 7.5,
            allow_suicide: false,
            ko_rule: KoRule::PositionalSuperko,
            scoring_rule: ScoringRule::TrompTaylorArea,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.board_size == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(RulesError::InvalidBoardSize(self.board_size));
        }
        Ok(())
    }
}
