use crate::vertex::{format_vertex, parse_vertex};
use tenuki_core::Move;

#[test]
fn parses_corners_on_a_19x19_board() {
    // A1 is the bottom-left corner, T19 the top-right.
    assert_eq!(parse_vertex("A1", 19), Some(Move::Play(18 * 19)));
    assert_eq!(parse_vertex("T19", 19), Some(Move::Play(18)));
    assert_eq!(parse_vertex("a1", 19), Some(Move::Play(18 * 19)));
}

#[test]
fn the_letter_i_is_skipped() {
    // J is the 9th column (index 8).
    assert_eq!(parse_vertex("J1", 19), Some(Move::Play(18 * 19 + 8)));
    assert_eq!(format_vertex(Move::Play(18 * 19 + 8), 19), "J1");
    // Column index 7 renders as H, not I.
    assert_eq!(format_vertex(Move::Play(18 * 19 + 7), 19), "H1");
}

#[test]
fn pass_is_recognized_case_insensitively() {
    assert_eq!(parse_vertex("pass", 9), Some(Move::Pass));
    assert_eq!(parse_vertex("PASS", 9), Some(Move::Pass));
    assert_eq!(format_vertex(Move::Pass, 9), "pass");
}

#[test]
fn out_of_range_vertices_are_rejected() {
    assert_eq!(parse_vertex("K5", 9), None); // column 9 on a 9x9 board
    assert_eq!(parse_vertex("A10", 9), None);
    assert_eq!(parse_vertex("A0", 9), None);
    assert_eq!(parse_vertex("", 9), None);
    assert_eq!(parse_vertex("5A", 9), None);
    assert_eq!(parse_vertex("Axy", 9), None);
}

#[test]
fn parse_and_format_round_trip() {
    for size in [5usize, 9, 13, 19] {
        for vertex in 0..size * size {
            let token = format_vertex(Move::Play(vertex), size);
            assert_eq!(parse_vertex(&token, size), Some(Move::Play(vertex)));
        }
    }
}
