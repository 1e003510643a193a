//! Whole-game stability and move-quality checks against the public API.

use std::sync::Arc;

use tenuki_core::{Board, Move, Player, Rules};
use tenuki_mcts::{Evaluation, Evaluator, SearchAgent, SearchConfig};

fn stress_config() -> SearchConfig {
    SearchConfig {
        max_playouts: 16,
        enable_playout_cap_randomization: false,
        dirichlet_epsilon: 0.0,
        num_threads: 4,
        ..SearchConfig::default()
    }
}

#[test]
fn parallel_search_plays_a_short_game_without_illegal_moves() {
    let rules = Rules {
        board_size: 5,
        komi: 0.0,
        ..Rules::default()
    };
    let mut board = Board::new(rules).expect("valid rules");
    let mut agent = SearchAgent::with_uniform_evaluator(stress_config()).expect("valid config");

    let mut to_move = Player::Black;
    for move_number in 0..30 {
        let mv = agent.select_move(&board, to_move, move_number);
        assert!(
            board.play_move(to_move, mv),
            "search produced an illegal move {mv:?} at ply {move_number}"
        );
        agent.notify_move(mv, &board, board.to_play());
        to_move = board.to_play();
    }
}

#[test]
fn fixed_seed_single_thread_replays_identically() {
    let rules = Rules {
        board_size: 5,
        komi: 0.0,
        ..Rules::default()
    };
    let config = SearchConfig {
        num_threads: 1,
        ..stress_config()
    };

    let mut moves_a = Vec::new();
    let mut moves_b = Vec::new();
    for moves in [&mut moves_a, &mut moves_b] {
        let mut board = Board::new(rules).expect("valid rules");
        let mut agent = SearchAgent::with_uniform_evaluator(config).expect("valid config");
        let mut to_move = Player::Black;
        for move_number in 0..10 {
            let mv = agent.select_move(&board, to_move, move_number);
            assert!(board.play_move(to_move, mv));
            agent.notify_move(mv, &board, board.to_play());
            moves.push(mv);
            to_move = board.to_play();
        }
    }
    assert_eq!(moves_a, moves_b);
}

/// Scores each candidate by the area difference after playing it, so the
/// obvious capture is the clear policy and value favorite.
struct OneStepScoreEvaluator;

impl OneStepScoreEvaluator {
    fn score_after_move(board: &Board, player: Player, mv: Move) -> Option<f32> {
        let mut copy = board.clone();
        if !copy.play_move(player, mv) {
            return None;
        }
        let score = copy.tromp_taylor_score();
        let diff = match player {
            Player::Black => score.black_points - score.white_points,
            Player::White => score.white_points - score.black_points,
        };
        Some(diff as f32)
    }
}

impl Evaluator for OneStepScoreEvaluator {
    fn evaluate(&self, board: &Board, to_play: Player) -> Evaluation {
        let area = board.board_size() * board.board_size();
        let mut raw = vec![f32::NEG_INFINITY; area + 1];
        let mut best = f32::NEG_INFINITY;
        let mut worst = f32::INFINITY;

        for vertex in 0..area {
            if board.point_state(vertex) != tenuki_core::PointState::Empty {
                continue;
            }
            if let Some(score) = Self::score_after_move(board, to_play, Move::Play(vertex)) {
                raw[vertex] = score;
                best = best.max(score);
                worst = worst.min(score);
            }
        }
        if let Some(score) = Self::score_after_move(board, to_play, Move::Pass) {
            raw[area] = score;
            best = best.max(score);
            worst = worst.min(score);
        }

        if !best.is_finite() {
            return Evaluation {
                policy: vec![1.0 / (area + 1) as f32; area + 1],
                value: 0.0,
            };
        }

        let offset = if best == worst { 0.0 } else { -worst };
        let mut policy = vec![0.0f32; area + 1];
        for (weight, score) in policy.iter_mut().zip(raw.iter()) {
            if !score.is_finite() {
                continue;
            }
            let shifted = score + offset;
            *weight = if shifted <= 0.0 { 1e-6 } else { shifted };
        }

        Evaluation {
            policy,
            value: (best / 10.0).clamp(-1.0, 1.0),
        }
    }
}

struct Scenario {
    history: Vec<(Player, Move)>,
    to_play: Player,
    optimal: Vec<Move>,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        // Black captures the White stone in atari at vertex 6 by playing 11.
        Scenario {
            history: vec![
                (Player::Black, Move::Play(1)),
                (Player::White, Move::Play(6)),
                (Player::Black, Move::Play(5)),
                (Player::White, Move::Pass),
                (Player::Black, Move::Play(7)),
                (Player::White, Move::Pass),
            ],
            to_play: Player::Black,
            optimal: vec![Move::Play(11)],
        },
        // Mirrored colors.
        Scenario {
            history: vec![
                (Player::White, Move::Play(1)),
                (Player::Black, Move::Play(6)),
                (Player::White, Move::Play(5)),
                (Player::Black, Move::Pass),
                (Player::White, Move::Play(7)),
                (Player::Black, Move::Pass),
            ],
            to_play: Player::White,
            optimal: vec![Move::Play(11)],
        },
    ]
}

#[test]
fn one_step_score_evaluator_finds_the_capture() {
    let config = SearchConfig {
        max_playouts: 64,
        enable_playout_cap_randomization: false,
        dirichlet_epsilon: 0.0,
        temperature: 0.0,
        temperature_move_cutoff: 0,
        num_threads: 1,
        ..SearchConfig::default()
    };

    for scenario in scenarios() {
        let rules = Rules {
            board_size: 5,
            komi: 0.0,
            ..Rules::default()
        };
        let mut board = Board::new(rules).expect("valid rules");
        for &(player, mv) in &scenario.history {
            assert!(board.play_move(player, mv));
        }
        board.set_to_play(scenario.to_play);

        let mut agent =
            SearchAgent::new(config, Arc::new(OneStepScoreEvaluator)).expect("valid config");
        let predicted = agent.select_move(
            &board,
            scenario.to_play,
            scenario.history.len() as u32,
        );
        assert!(
            scenario.optimal.contains(&predicted),
            "expected one of {:?}, got {predicted:?}",
            scenario.optimal
        );
    }
}
