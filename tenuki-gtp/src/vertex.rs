//! GTP vertex notation: column letters A..Z skipping I, 1-based rows
//! counted from the bottom of the board.

use tenuki_core::Move;

/// Parse a vertex token like `D4` or `pass`. Returns `None` for anything
/// that does not name a point on a `board_size` board.
pub fn parse_vertex(token: &str, board_size: usize) -> Option<Move> {
    if token.eq_ignore_ascii_case("pass") {
        return Some(Move::Pass);
    }

    let mut chars = token.chars();
    let column_char = chars.next()?.to_ascii_uppercase();
    if !column_char.is_ascii_uppercase() {
        return None;
    }
    let mut column = column_char as i32 - 'A' as i32;
    if column_char >= 'I' {
        column -= 1;
    }

    let row: i32 = chars.as_str().parse().ok()?;
    if row <= 0 || row > board_size as i32 {
        return None;
    }
    if column < 0 || column >= board_size as i32 {
        return None;
    }

    let x = column as usize;
    let y = board_size - row as usize;
    Some(Move::Play(y * board_size + x))
}

/// Format a move in GTP notation; passes render as `pass`.
pub fn format_vertex(mv: Move, board_size: usize) -> String {
    match mv {
        Move::Pass => "pass".to_string(),
        Move::Play(vertex) => {
            let x = vertex % board_size;
            let y = vertex / board_size;
            let row = board_size - y;
            let mut column = (b'A' + x as u8) as char;
            if column >= 'I' {
                column = (column as u8 + 1) as char;
            }
            format!("{column}{row}")
        }
    }
}
