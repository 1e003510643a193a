use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tenuki_core::{Board, Move, Player, Rules};

/// A late-game-like 19x19 position: two large territories with a contested
/// middle strip.
fn endgame_board() -> Board {
    let rules = Rules {
        board_size: 19,
        komi: 7.5,
        ..Rules::default()
    };
    let mut board = Board::new(rules).expect("valid rules");
    for y in 0..19usize {
        assert!(board.play_move(Player::Black, Move::Play(y * 19 + 6)));
        assert!(board.play_move(Player::White, Move::Play(y * 19 + 12)));
    }
    board
}

fn bench_tromp_taylor(c: &mut Criterion) {
    let board = endgame_board();
    c.bench_function("tromp_taylor_score_19x19", |b| {
        b.iter(|| black_box(board.tromp_taylor_score()))
    });
}

criterion_group!(benches, bench_tromp_taylor);
criterion_main!(benches);
