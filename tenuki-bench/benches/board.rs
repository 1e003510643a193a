use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tenuki_core::{Board, Move, Player, Rules};

fn rules_19() -> Rules {
    Rules {
        board_size: 19,
        komi: 7.5,
        ..Rules::default()
    }
}

/// A loose spiral of alternating stones, enough to exercise captures and
/// group walks without ending the game.
fn seeded_board() -> Board {
    let mut board = Board::new(rules_19()).expect("valid rules");
    let mut player = Player::Black;
    for step in 0..120usize {
        let vertex = (step * 37) % 361;
        if board.play_move(player, Move::Play(vertex)) {
            player = player.other();
        }
    }
    board
}

fn bench_play_move(c: &mut Criterion) {
    let board = seeded_board();
    c.bench_function("play_move_19x19", |b| {
        b.iter(|| {
            let mut copy = board.clone();
            black_box(copy.play_move(copy.to_play(), Move::Play(180)))
        })
    });
}

fn bench_is_legal_sweep(c: &mut Criterion) {
    let board = seeded_board();
    let to_play = board.to_play();
    c.bench_function("is_legal_full_sweep_19x19", |b| {
        b.iter(|| {
            let mut legal = 0usize;
            for vertex in 0..361 {
                if board.is_legal(to_play, Move::Play(vertex)) {
                    legal += 1;
                }
            }
            black_box(legal)
        })
    });
}

criterion_group!(benches, bench_play_move, bench_is_legal_sweep);
criterion_main!(benches);
