//! Best-effort SGF loading. Malformed input yields whatever prefix could
//! be understood, never an error.

use crate::record::{GameTree, MoveRecord};
use tenuki_core::{Move, Player, MAX_BOARD_SIZE};

/// Parse an SGF document. Whitespace is stripped before parsing.
pub fn load(input: &str) -> GameTree {
    let mut game = GameTree::default();

    let stripped: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return game;
    }

    if let Some(value) = extract_property(&stripped, "SZ") {
        if let Ok(size) = value.parse::<usize>() {
            if (1..=MAX_BOARD_SIZE).contains(&size) {
                game.board_size = size;
            }
        }
    }
    if let Some(value) = extract_property(&stripped, "KM") {
        if let Ok(komi) = value.parse::<f64>() {
            game.komi = komi;
        }
    }

    let mut pos = 0usize;
    while pos < stripped.len() {
        if stripped[pos] != ';' || pos + 4 >= stripped.len() {
            pos += 1;
            continue;
        }

        let color_char = stripped[pos + 1];
        pos += 2;
        if stripped[pos] != '[' {
            pos += 1;
            continue;
        }
        pos += 1;
        let mut value = String::new();
        while pos < stripped.len() && stripped[pos] != ']' {
            value.push(stripped[pos]);
            pos += 1;
        }
        pos += 1; // skip ']'

        let player = match color_char {
            'B' | 'b' => Player::Black,
            'W' | 'w' => Player::White,
            _ => continue,
        };

        let mv = match parse_move_value(&value, game.board_size) {
            Some(mv) => mv,
            None => continue,
        };
        game.moves.push(MoveRecord { player, mv });
    }

    game
}

/// First bracketed value of `prop`, with backslash escapes resolved.
fn extract_property(data: &[char], prop: &str) -> Option<String> {
    let needle: Vec<char> = prop.chars().chain(['[']).collect();
    let start = data
        .windows(needle.len())
        .position(|window| window == needle.as_slice())?
        + needle.len();

    let mut value = String::new();
    let mut pos = start;
    while pos < data.len() && data[pos] != ']' {
        let c = data[pos];
        pos += 1;
        if c == '\\' && pos < data.len() {
            value.push(data[pos]);
            pos += 1;
        } else {
            value.push(c);
        }
    }
    Some(value)
}

/// Empty brackets denote a pass; otherwise two lowercase letters encode
/// column and row. Anything else is unusable.
fn parse_move_value(value: &str, board_size: usize) -> Option<Move> {
    if value.is_empty() {
        return Some(Move::Pass);
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() != 2 {
        return None;
    }
    let x = decode_coord(chars[0])?;
    let y = decode_coord(chars[1])?;
    if x >= board_size || y >= board_size {
        return None;
    }
    Some(Move::Play(y * board_size + x))
}

fn decode_coord(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some(c as usize - 'a' as usize)
    } else {
        None
    }
}
