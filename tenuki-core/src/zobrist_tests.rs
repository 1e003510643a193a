use crate::zobrist::ZobristTable;

#[test]
fn tables_are_stable_across_instances() {
    let a = ZobristTable::new(9);
    let b = ZobristTable::new(9);

    for vertex in 0..81 {
        assert_eq!(a.black_key(vertex), b.black_key(vertex));
        assert_eq!(a.white_key(vertex), b.white_key(vertex));
        assert_eq!(a.ko_key(vertex), b.ko_key(vertex));
    }
    assert_eq!(a.side_to_move_key(), b.side_to_move_key());
}

#[test]
fn keys_are_distinct_within_a_table() {
    let table = ZobristTable::new(5);
    let mut seen = std::collections::HashSet::new();
    for vertex in 0..25 {
        assert!(seen.insert(table.black_key(vertex)));
        assert!(seen.insert(table.white_key(vertex)));
        assert!(seen.insert(table.ko_key(vertex)));
    }
    assert!(seen.insert(table.side_to_move_key()));
}

#[test]
fn key_draw_order_is_independent_of_board_size_prefix() {
    // Smaller tables draw fewer keys but from the same fixed-seed stream,
    // so a given table size always sees the same values.
    let small = ZobristTable::new(3);
    let again = ZobristTable::new(3);
    assert_eq!(small.black_key(0), again.black_key(0));
    assert_eq!(small.side_to_move_key(), again.side_to_move_key());
}
