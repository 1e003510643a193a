//! Zobrist key tables for incremental position hashing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fixed seed so the key tables are identical across runs and processes.
const TABLE_SEED: u64 = 0x5eed_bad;

/// Per-board-size tables of 64-bit keys: one per point per stone color,
/// one per point for the ko marker, and a single side-to-move key.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    board_size: usize,
    black: Vec<u64>,
    white: Vec<u64>,
    ko: Vec<u64>,
    side_to_move: u64,
}

impl ZobristTable {
    pub fn new(board_size: usize) -> Self {
        let total = board_size * board_size;
        let mut rng = ChaCha8Rng::seed_from_u64(TABLE_SEED);
        let black = (0..total).map(|_| rng.gen::<u64>()).collect();
        let white = (0..total).map(|_| rng.gen::<u64>()).collect();
        let ko = (0..total).map(|_| rng.gen::<u64>()).collect();
        let side_to_move = rng.gen::<u64>();
        Self {
            board_size,
            black,
            white,
            ko,
            side_to_move,
        }
    }

    pub fn black_key(&self, vertex: usize) -> u64 {
        self.black[vertex]
    }

    pub fn white_key(&self, vertex: usize) -> u64 {
        self.white[vertex]
    }

    pub fn ko_key(&self, vertex: usize) -> u64 {
        self.ko[vertex]
    }

    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }
}
