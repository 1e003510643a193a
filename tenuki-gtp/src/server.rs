//! The GTP command loop and handlers.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::vertex::{format_vertex, parse_vertex};
use tenuki_core::{Board, Move, Player, Rules, RulesError};
use tenuki_logging::{GameEventV1, NdjsonWriter, SearchRootEventV1, VersionInfoV1};
use tenuki_mcts::{Evaluator, RootSummary, SearchAgent, SearchConfig, SearchConfigError};

const ENGINE_NAME: &str = "Tenuki";

const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Search(#[from] SearchConfigError),
}

pub struct Server {
    board: Board,
    agent: SearchAgent,
    evaluator: Arc<dyn Evaluator>,
    search_config: SearchConfig,
    move_number: u32,
    log: Option<NdjsonWriter>,
}

impl Server {
    pub fn new(
        rules: Rules,
        search_config: SearchConfig,
        evaluator: Arc<dyn Evaluator>,
    ) -> Result<Self, ServerError> {
        let board = Board::new(rules)?;
        let agent = SearchAgent::new(search_config, Arc::clone(&evaluator))?;
        Ok(Self {
            board,
            agent,
            evaluator,
            search_config,
            move_number: 0,
            log: None,
        })
    }

    /// Attach an NDJSON event log. Logging is best-effort: write errors
    /// never surface to the GTP client.
    pub fn with_log(mut self, log: NdjsonWriter) -> Self {
        self.log = Some(log);
        self
    }

    /// Process GTP commands until EOF or `quit`.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => &line[..],
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.splitn(2, char::is_whitespace);
            let first = match tokens.next() {
                Some(token) => token,
                None => continue,
            };
            let rest = tokens.next().unwrap_or("").trim();

            let (id, command, args);
            if first.starts_with(|c: char| c.is_ascii_digit()) {
                id = first;
                let mut tail = rest.splitn(2, char::is_whitespace);
                match tail.next().filter(|token| !token.is_empty()) {
                    Some(token) => {
                        command = token.to_lowercase();
                        args = tail.next().unwrap_or("").trim().to_string();
                    }
                    None => {
                        write!(output, "{}", format_response(false, id, "missing_command"))?;
                        output.flush()?;
                        continue;
                    }
                }
            } else {
                id = "";
                command = first.to_lowercase();
                args = rest.to_string();
            }

            let (success, payload) = self.execute(&command, &args);
            write!(output, "{}", format_response(success, id, &payload))?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Dispatch one command. Returns (success, payload).
    pub fn execute(&mut self, command: &str, args: &str) -> (bool, String) {
        match command {
            "protocol_version" => (true, "2".to_string()),
            "name" => (true, ENGINE_NAME.to_string()),
            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),
            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),
            "known_command" => {
                let token = args.split_whitespace().next().unwrap_or("");
                let known = KNOWN_COMMANDS.contains(&token.to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }
            "boardsize" => self.handle_boardsize(args),
            "clear_board" => self.handle_clear_board(),
            "komi" => self.handle_komi(args),
            "play" => self.handle_play(args),
            "genmove" => self.handle_genmove(args),
            "final_score" => self.handle_final_score(),
            "showboard" => (true, self.render_board()),
            "quit" => (true, String::new()),
            _ => (false, "unknown_command".to_string()),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn handle_boardsize(&mut self, args: &str) -> (bool, String) {
        let size: usize = match args.split_whitespace().next().and_then(|t| t.parse().ok()) {
            Some(size) => size,
            None => return (false, "boardsize requires argument".to_string()),
        };
        let rules = Rules {
            board_size: size,
            ..*self.board.rules()
        };
        match Board::new(rules) {
            Ok(board) => {
                self.board = board;
                self.reset_search();
                self.log_game_event("board_reset");
                (true, String::new())
            }
            Err(_) => (false, "invalid boardsize".to_string()),
        }
    }

    fn handle_clear_board(&mut self) -> (bool, String) {
        self.board.clear();
        self.board.set_to_play(Player::Black);
        self.reset_search();
        self.log_game_event("board_reset");
        (true, String::new())
    }

    fn handle_komi(&mut self, args: &str) -> (bool, String) {
        let komi: f64 = match args.split_whitespace().next().and_then(|t| t.parse().ok()) {
            Some(komi) => komi,
            None => return (false, "komi requires value".to_string()),
        };
        let rules = Rules {
            komi,
            ..*self.board.rules()
        };
        match Board::new(rules) {
            Ok(board) => {
                self.board = board;
                self.reset_search();
                self.log_game_event("board_reset");
                (true, String::new())
            }
            Err(_) => (false, "invalid komi".to_string()),
        }
    }

    fn handle_play(&mut self, args: &str) -> (bool, String) {
        let mut tokens = args.split_whitespace();
        let color_token = tokens.next();
        let vertex_token = tokens.next();
        let (color_token, vertex_token) = match (color_token, vertex_token) {
            (Some(color), Some(vertex)) => (color, vertex),
            _ => return (false, "play requires color and vertex".to_string()),
        };

        let color = match parse_color(color_token) {
            Some(color) => color,
            None => return (false, "invalid color".to_string()),
        };
        let mv = match parse_vertex(vertex_token, self.board.board_size()) {
            Some(mv) => mv,
            None => return (false, "invalid vertex".to_string()),
        };

        self.board.set_to_play(color);
        if !self.board.play_move(color, mv) {
            return (false, "illegal move".to_string());
        }
        self.move_number += 1;
        self.agent.notify_move(mv, &self.board, self.board.to_play());
        (true, String::new())
    }

    fn handle_genmove(&mut self, args: &str) -> (bool, String) {
        let color = match args.split_whitespace().next() {
            Some(token) => match parse_color(token) {
                Some(color) => color,
                None => return (false, "invalid color".to_string()),
            },
            None => self.board.to_play(),
        };

        self.board.set_to_play(color);

        let start = Instant::now();
        let mv = self.agent.select_move(&self.board, color, self.move_number);
        // Snapshot root statistics before the tree is promoted away.
        let summary = self.agent.root_summary();
        if !self.board.play_move(color, mv) {
            return (false, "genmove failed".to_string());
        }
        self.move_number += 1;
        self.agent.notify_move(mv, &self.board, self.board.to_play());

        self.log_search_event(color, mv, summary, start.elapsed().as_micros() as u64);
        (true, format_vertex(mv, self.board.board_size()))
    }

    fn handle_final_score(&mut self) -> (bool, String) {
        let score = self.board.tromp_taylor_score();
        let diff = score.black_points - score.white_points;
        let payload = if diff.abs() < 1e-6 {
            "0".to_string()
        } else if diff > 0.0 {
            format!("B+{:.1}", diff)
        } else {
            format!("W+{:.1}", diff.abs())
        };
        (true, payload)
    }

    fn render_board(&self) -> String {
        let size = self.board.board_size();
        let mut out = String::new();

        out.push_str("  ");
        for x in 0..size {
            out.push(column_letter(x));
            out.push(' ');
        }
        out.push('\n');

        for y in 0..size {
            let row = size - y;
            out.push_str(&format!("{row:2} "));
            for x in 0..size {
                let symbol = match self.board.point_state(y * size + x) {
                    tenuki_core::PointState::Black => 'X',
                    tenuki_core::PointState::White => 'O',
                    tenuki_core::PointState::Empty => '.',
                };
                out.push(symbol);
                out.push(' ');
            }
            out.push_str(&row.to_string());
            out.push('\n');
        }

        out.push_str("  ");
        for x in 0..size {
            out.push(column_letter(x));
            out.push(' ');
        }
        out
    }

    fn reset_search(&mut self) {
        self.move_number = 0;
        // A fresh agent rather than reset() so a changed board size or komi
        // can never collide with a stale root hash.
        if let Ok(agent) = SearchAgent::new(self.search_config, Arc::clone(&self.evaluator)) {
            self.agent = agent;
        } else {
            self.agent.reset();
        }
    }

    fn log_game_event(&mut self, event: &'static str) {
        let record = GameEventV1 {
            event,
            v: VersionInfoV1::default(),
            board_size: self.board.board_size(),
            komi: self.board.rules().komi,
        };
        if let Some(log) = &mut self.log {
            let _ = log.write_event(&record);
            let _ = log.flush();
        }
    }

    fn log_search_event(
        &mut self,
        color: Player,
        mv: Move,
        summary: Option<RootSummary>,
        elapsed_us: u64,
    ) {
        let record = SearchRootEventV1 {
            event: "search_root",
            v: VersionInfoV1::default(),
            game_ply: self.move_number,
            to_play: match color {
                Player::Black => "b",
                Player::White => "w",
            },
            chosen_move: format_vertex(mv, self.board.board_size()),
            root_visits: summary.map(|s| s.visit_count).unwrap_or(0),
            root_value: summary.map(|s| s.value).unwrap_or(0.0),
            elapsed_us,
        };
        if let Some(log) = &mut self.log {
            let _ = log.write_event(&record);
            let _ = log.flush();
        }
    }
}

fn parse_color(token: &str) -> Option<Player> {
    match token.chars().next()?.to_ascii_lowercase() {
        'b' => Some(Player::Black),
        'w' => Some(Player::White),
        _ => None,
    }
}

fn column_letter(x: usize) -> char {
    let mut letter = (b'A' + x as u8) as char;
    if letter >= 'I' {
        letter = (letter as u8 + 1) as char;
    }
    letter
}

fn format_response(success: bool, id: &str, payload: &str) -> String {
    let mut out = String::new();
    out.push(if success { '=' } else { '?' });
    out.push_str(id);
    if !payload.is_empty() {
        out.push(' ');
        out.push_str(payload);
    }
    out.push_str("\n\n");
    out
}
