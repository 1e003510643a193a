//! SGF serialization.

use std::fmt::Write as _;

use thiserror::Error;

use crate::record::GameTree;
use tenuki_core::{Move, Player};

#[derive(Debug, Error)]
pub enum SgfError {
    #[error("vertex {vertex} does not fit a {board_size}x{board_size} board")]
    VertexOutOfRange { vertex: usize, board_size: usize },
}

/// Serialize a game record as a single SGF variation.
pub fn save(game: &GameTree) -> Result<String, SgfError> {
    let mut out = String::new();
    out.push_str("(;");
    let _ = write!(out, "SZ[{}]", game.board_size);
    let _ = write!(out, "KM[{}]", game.komi);

    for record in &game.moves {
        out.push(';');
        out.push(match record.player {
            Player::Black => 'B',
            Player::White => 'W',
        });
        out.push('[');
        if let Move::Play(vertex) = record.mv {
            if vertex >= game.board_size * game.board_size {
                return Err(SgfError::VertexOutOfRange {
                    vertex,
                    board_size: game.board_size,
                });
            }
            out.push(encode_coord(vertex % game.board_size));
            out.push(encode_coord(vertex / game.board_size));
        }
        out.push(']');
    }
    out.push(')');
    Ok(out)
}

fn encode_coord(value: usize) -> char {
    (b'a' + value as u8) as char
}
