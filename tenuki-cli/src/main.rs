//! tenuki: GTP engine binary.
//!
//! Subcommands:
//! - `gtp` (default): serve GTP v2 on stdin/stdout
//! - `bench`: measure playout throughput across thread counts
//!
//! Environment overrides (invalid or out-of-range values are silently
//! ignored): `TENUKI_MAX_PLAYOUTS`, `TENUKI_RANDOM_PLAYOUTS_MIN`,
//! `TENUKI_RANDOM_PLAYOUTS_MAX`, `TENUKI_NUM_THREADS`.

use std::env;
use std::io;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use tenuki_core::{Board, Config, Player, SearchSettings};
use tenuki_gtp::Server;
use tenuki_logging::NdjsonWriter;
use tenuki_mcts::{SearchAgent, SearchConfig, UniformEvaluator};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => cmd_gtp(&[]),
        Some("gtp") => cmd_gtp(&args[1..]),
        Some("bench") => cmd_bench(&args[1..]),
        Some("--help" | "-h" | "help") => print_help(),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(1);
        }
    }
}

fn print_help() {
    eprintln!(
        r#"tenuki - a Go engine speaking GTP

USAGE:
    tenuki [gtp] [--config FILE] [--log FILE]
    tenuki bench [--board-size N] [--playouts N] [--iterations N]
                 [--threads a,b,c] [--seed N]

COMMANDS:
    gtp      Serve GTP v2 on stdin/stdout (default when no command given)
    bench    Benchmark search throughput and print CSV
"#
    );
}

fn cmd_gtp(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut log_path: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Missing value for --config");
                    process::exit(1);
                }
                config_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--log" => {
                if i + 1 >= args.len() {
                    eprintln!("Missing value for --log");
                    process::exit(1);
                }
                log_path = Some(args[i + 1].clone());
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `tenuki gtp`: {other}");
                process::exit(1);
            }
        }
    }

    let config = match config_path {
        Some(path) => Config::load(&path).unwrap_or_else(|e| {
            eprintln!("Failed to load {path}: {e}");
            process::exit(1);
        }),
        None => Config::default(),
    };

    let rules = config.rules.to_rules().unwrap_or_else(|e| {
        eprintln!("Invalid rules: {e}");
        process::exit(1);
    });
    let mut search = to_search_config(&config.search);
    apply_env_overrides(&mut search);

    let mut server = Server::new(rules, search, Arc::new(UniformEvaluator)).unwrap_or_else(|e| {
        eprintln!("Failed to start engine: {e}");
        process::exit(1);
    });

    if let Some(path) = log_path {
        match NdjsonWriter::open_append(&path) {
            Ok(log) => server = server.with_log(log),
            Err(_) => eprintln!("Could not open log file {path}; continuing without logging"),
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = server.run(stdin.lock(), stdout.lock()) {
        eprintln!("GTP session failed: {e}");
        process::exit(1);
    }
}

struct BenchOptions {
    board_size: usize,
    playouts: u32,
    iterations: u32,
    seed: u64,
    thread_counts: Vec<usize>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            board_size: 19,
            playouts: 512,
            iterations: 16,
            seed: 0x5eed_1234,
            thread_counts: vec![1, 2, 4],
        }
    }
}

fn cmd_bench(args: &[String]) {
    let mut options = BenchOptions::default();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--board-size" => {
                options.board_size = parse_bench_value(args, &mut i, "--board-size");
            }
            "--playouts" => {
                options.playouts = parse_bench_value(args, &mut i, "--playouts");
            }
            "--iterations" => {
                options.iterations = parse_bench_value(args, &mut i, "--iterations");
            }
            "--seed" => {
                options.seed = parse_bench_value(args, &mut i, "--seed");
            }
            "--threads" => {
                if i + 1 >= args.len() {
                    eprintln!("Missing value for --threads");
                    process::exit(1);
                }
                let counts: Vec<usize> = args[i + 1]
                    .split(',')
                    .filter(|token| !token.is_empty())
                    .map(|token| {
                        token.parse().ok().filter(|&n| n > 0).unwrap_or_else(|| {
                            eprintln!("Invalid --threads value: {}", args[i + 1]);
                            process::exit(1);
                        })
                    })
                    .collect();
                if counts.is_empty() {
                    eprintln!("Invalid --threads value: {}", args[i + 1]);
                    process::exit(1);
                }
                options.thread_counts = counts;
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `tenuki bench`: {other}");
                process::exit(1);
            }
        }
    }

    let rules = tenuki_core::Rules {
        board_size: options.board_size,
        ..tenuki_core::Rules::default()
    };
    let mut board = Board::new(rules).unwrap_or_else(|e| {
        eprintln!("Invalid board size: {e}");
        process::exit(1);
    });

    println!("# Tenuki Search Benchmark");
    println!(
        "# board_size={} playouts={} iterations={} seed={:#x}",
        options.board_size, options.playouts, options.iterations, options.seed
    );
    println!("threads,seconds,total_playouts,playouts_per_second");

    for &thread_count in &options.thread_counts {
        let config = SearchConfig {
            max_playouts: options.playouts,
            enable_playout_cap_randomization: false,
            dirichlet_epsilon: 0.0,
            temperature: 0.0,
            temperature_move_cutoff: 0,
            num_threads: thread_count,
            seed: options.seed,
            ..SearchConfig::default()
        };
        let mut agent = SearchAgent::with_uniform_evaluator(config).unwrap_or_else(|e| {
            eprintln!("Invalid search config: {e}");
            process::exit(1);
        });

        let start = Instant::now();
        for _ in 0..options.iterations {
            agent.reset();
            board.clear();
            board.set_to_play(Player::Black);
            agent.select_move(&board, board.to_play(), 0);
        }
        let seconds = start.elapsed().as_secs_f64();

        let total_playouts = options.iterations as f64 * options.playouts as f64;
        let playouts_per_second = if seconds > 0.0 {
            total_playouts / seconds
        } else {
            0.0
        };
        println!(
            "{},{:.6},{},{:.2}",
            thread_count, seconds, total_playouts as u64, playouts_per_second
        );
    }
}

/// Parse the value following a flag, exiting with a message on anything
/// unusable.
fn parse_bench_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    if *i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    let parsed = args[*i + 1].parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {flag}: {}", args[*i + 1]);
        process::exit(1);
    });
    *i += 2;
    parsed
}

fn to_search_config(settings: &SearchSettings) -> SearchConfig {
    SearchConfig {
        max_playouts: settings.max_playouts,
        enable_playout_cap_randomization: settings.enable_playout_cap_randomization,
        random_playouts_min: settings.random_playouts_min,
        random_playouts_max: settings.random_playouts_max,
        cpuct: settings.cpuct,
        fpu_reduction: settings.fpu_reduction,
        dirichlet_alpha: settings.dirichlet_alpha,
        dirichlet_epsilon: settings.dirichlet_epsilon,
        temperature: settings.temperature,
        temperature_move_cutoff: settings.temperature_move_cutoff,
        num_threads: settings.num_threads,
        use_virtual_loss: settings.use_virtual_loss,
        virtual_loss: settings.virtual_loss,
        virtual_loss_visits: settings.virtual_loss_visits,
        seed: settings.seed,
    }
}

/// Integer overrides from the environment; unparsable or out-of-range
/// values are silently ignored.
fn apply_env_overrides(config: &mut SearchConfig) {
    override_u32("TENUKI_MAX_PLAYOUTS", &mut config.max_playouts);
    override_u32("TENUKI_RANDOM_PLAYOUTS_MIN", &mut config.random_playouts_min);
    override_u32("TENUKI_RANDOM_PLAYOUTS_MAX", &mut config.random_playouts_max);
    override_usize("TENUKI_NUM_THREADS", &mut config.num_threads);
}

fn override_u32(name: &str, target: &mut u32) {
    if let Ok(raw) = env::var(name) {
        if let Ok(value) = raw.trim().parse::<u32>() {
            if value > 0 {
                *target = value;
            }
        }
    }
}

fn override_usize(name: &str, target: &mut usize) {
    if let Ok(raw) = env::var(name) {
        if let Ok(value) = raw.trim().parse::<usize>() {
            if value > 0 {
                *target = value;
            }
        }
    }
}
