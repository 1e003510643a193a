//! tenuki-core: Go game rules, board state, Zobrist hashing, and scoring.

pub mod board;
pub mod config;
pub mod rules;
pub mod zobrist;

pub use board::{Board, Move, Player, PointState, ScoreError, ScoreResult};
pub use config::{Config, ConfigError, RulesConfig, SearchSettings};
pub use rules::{KoRule, Rules, RulesError, ScoringRule, MAX_BOARD_SIZE};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}

#[cfg(test)]
mod zobrist_tests;
