//! Board state machine: stone placement, captures, legality, ko and
//! superko enforcement, incremental Zobrist hashing, and area scoring.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::rules::{KoRule, Rules, RulesError, ScoringRule};
use crate::zobrist::ZobristTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// The stone color this player places.
    pub fn stone(self) -> PointState {
        match self {
            Player::Black => PointState::Black,
            Player::White => PointState::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    Empty,
    Black,
    White,
}

/// A ply: either a pass or a vertex index `v = y * board_size + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Play(usize),
}

impl Move {
    pub fn is_pass(self) -> bool {
        matches!(self, Move::Pass)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreResult {
    pub black_points: f64,
    pub white_points: f64,
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("territory scoring is not implemented")]
    TerritoryUnsupported,
}

/// Mutable whole-game board state.
///
/// Not internally synchronized; callers must not share one board across
/// threads without external synchronization. `Clone` is cheap enough for
/// trial play and per-simulation copies (the Zobrist table is shared).
#[derive(Clone)]
pub struct Board {
    rules: Rules,
    board_len: usize,
    points: Vec<PointState>,
    to_play: Player,
    ko_vertex: Option<usize>,
    zobrist: Arc<ZobristTable>,
    position_hash: u64,
    seen_positions: FxHashSet<u64>,
    history: Vec<u64>,
}

impl Board {
    pub fn new(rules: Rules) -> Result<Self, RulesError> {
        rules.validate()?;
        let board_len = rules.board_size * rules.board_size;
        let mut board = Self {
            rules,
            board_len,
            points: vec![PointState::Empty; board_len],
            to_play: Player::Black,
            ko_vertex: None,
            zobrist: Arc::new(ZobristTable::new(rules.board_size)),
            position_hash: 0,
            seen_positions: FxHashSet::default(),
            history: Vec::new(),
        };
        board.clear();
        Ok(board)
    }

    /// Reset to an empty board with Black to play. The empty-board hash
    /// seeds both the history stack and the superko seen-set.
    pub fn clear(&mut self) {
        self.points.fill(PointState::Empty);
        self.to_play = Player::Black;
        self.ko_vertex = None;
        self.position_hash = 0;
        self.seen_positions.clear();
        self.history.clear();
        self.seen_positions.insert(self.position_hash);
        self.history.push(self.position_hash);
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board_size(&self) -> usize {
        self.rules.board_size
    }

    pub fn to_play(&self) -> Player {
        self.to_play
    }

    pub fn set_to_play(&mut self, player: Player) {
        self.to_play = player;
    }

    pub fn ko_vertex(&self) -> Option<usize> {
        self.ko_vertex
    }

    pub fn position_hash(&self) -> u64 {
        self.position_hash
    }

    pub fn seen_positions(&self) -> &FxHashSet<u64> {
        &self.seen_positions
    }

    /// Hash after every applied ply, oldest first (starts with the
    /// empty-board hash).
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Panics if `vertex` is out of range.
    pub fn point_state(&self, vertex: usize) -> PointState {
        self.points[vertex]
    }

    /// Position hash combined with the side-to-move key; identifies a
    /// search root.
    pub fn state_key(&self) -> u64 {
        let mut key = self.position_hash;
        if self.to_play == Player::White {
            key ^= self.zobrist.side_to_move_key();
        }
        key
    }

    pub(crate) fn zobrist(&self) -> &ZobristTable {
        &self.zobrist
    }

    /// Apply a move for `player` and advance the turn. Returns `false`
    /// (leaving the board unchanged) if the move is illegal: out of range,
    /// occupied, the simple-ko vertex, suicide when disallowed, or a
    /// superko repetition.
    pub fn play_move(&mut self, player: Player, mv: Move) -> bool {
        let vertex = match mv {
            Move::Pass => {
                self.set_ko(None);
                self.to_play = player.other();
                self.history.push(self.position_hash);
                self.seen_positions.insert(self.position_hash);
                return true;
            }
            Move::Play(vertex) => vertex,
        };

        if vertex >= self.board_len || self.points[vertex] != PointState::Empty {
            return false;
        }
        if self.ko_vertex == Some(vertex) {
            return false;
        }

        let stone = player.stone();
        let opponent = player.other().stone();
        let previous_ko = self.ko_vertex;

        self.place_stone(vertex, stone);

        let mut captured: Vec<usize> = Vec::new();
        for neighbor in self.neighbors(vertex) {
            if self.points[neighbor] != opponent {
                continue;
            }
            let (group, liberties) = self.collect_group(neighbor, opponent);
            if liberties == 0 {
                for &v in &group {
                    self.remove_stone(v);
                    captured.push(v);
                }
            }
        }

        let liberties = self.count_liberties(vertex, stone);
        if liberties == 0 && captured.is_empty() && !self.rules.allow_suicide {
            self.remove_stone(vertex);
            self.set_ko(previous_ko);
            return false;
        }

        // Simple ko shape: exactly one stone captured and the new group is
        // itself in atari. Applies under both ko rules.
        let mut new_ko = None;
        if captured.len() == 1 && self.count_liberties(vertex, stone) == 1 {
            new_ko = Some(captured[0]);
        }
        self.set_ko(new_ko);

        if self.violates_superko(self.position_hash) {
            self.set_ko(previous_ko);
            self.remove_stone(vertex);
            for &v in &captured {
                self.place_stone(v, opponent);
            }
            return false;
        }

        self.to_play = player.other();
        self.history.push(self.position_hash);
        self.seen_positions.insert(self.position_hash);
        true
    }

    /// Read-only legality predicate, realized as trial play on a copy.
    pub fn is_legal(&self, player: Player, mv: Move) -> bool {
        let mut copy = self.clone();
        copy.play_move(player, mv)
    }

    /// Score under the configured scoring rule.
    pub fn score(&self) -> Result<ScoreResult, ScoreError> {
        match self.rules.scoring_rule {
            ScoringRule::TrompTaylorArea => Ok(self.tromp_taylor_score()),
            ScoringRule::Territory => Err(ScoreError::TerritoryUnsupported),
        }
    }

    /// Stones plus empty regions bordered by a single color only; komi is
    /// added to White.
    pub fn tromp_taylor_score(&self) -> ScoreResult {
        let mut result = ScoreResult::default();
        let mut visited = vec![false; self.board_len];

        for vertex in 0..self.board_len {
            match self.points[vertex] {
                PointState::Black => result.black_points += 1.0,
                PointState::White => result.white_points += 1.0,
                PointState::Empty => {
                    if visited[vertex] {
                        continue;
                    }
                    let mut queue = VecDeque::new();
                    queue.push_back(vertex);
                    visited[vertex] = true;
                    let mut borders_black = false;
                    let mut borders_white = false;
                    let mut region_size = 0usize;

                    while let Some(v) = queue.pop_front() {
                        region_size += 1;
                        for n in self.neighbors(v) {
                            match self.points[n] {
                                PointState::Empty => {
                                    if !visited[n] {
                                        visited[n] = true;
                                        queue.push_back(n);
                                    }
                                }
                                PointState::Black => borders_black = true,
                                PointState::White => borders_white = true,
                            }
                        }
                    }

                    if borders_black && !borders_white {
                        result.black_points += region_size as f64;
                    } else if borders_white && !borders_black {
                        result.white_points += region_size as f64;
                    }
                }
            }
        }

        result.white_points += self.rules.komi;
        result
    }

    fn neighbors(&self, vertex: usize) -> Vec<usize> {
        let size = self.rules.board_size as isize;
        let x = (vertex as isize) % size;
        let y = (vertex as isize) / size;
        let mut out = Vec::with_capacity(4);
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let nx = x + dx;
            let ny = y + dy;
            if nx >= 0 && ny >= 0 && nx < size && ny < size {
                out.push((ny * size + nx) as usize);
            }
        }
        out
    }

    /// Flood-fill the same-color group at `vertex`, returning its vertices
    /// and a liberty count. The count may include duplicates; it is only
    /// compared against zero.
    fn collect_group(&self, vertex: usize, color: PointState) -> (Vec<usize>, usize) {
        let mut visited = vec![false; self.board_len];
        let mut queue = VecDeque::new();
        let mut group = Vec::new();
        let mut liberties = 0usize;
        visited[vertex] = true;
        queue.push_back(vertex);

        while let Some(v) = queue.pop_front() {
            group.push(v);
            for n in self.neighbors(v) {
                if self.points[n] == PointState::Empty {
                    liberties += 1;
                } else if self.points[n] == color && !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
        (group, liberties)
    }

    /// Distinct liberty count of the group containing `vertex`.
    fn count_liberties(&self, vertex: usize, color: PointState) -> usize {
        let mut visited = vec![false; self.board_len];
        let mut liberty_seen = vec![false; self.board_len];
        let mut queue = VecDeque::new();
        let mut liberties = 0usize;
        visited[vertex] = true;
        queue.push_back(vertex);

        while let Some(v) = queue.pop_front() {
            for n in self.neighbors(v) {
                if self.points[n] == PointState::Empty {
                    if !liberty_seen[n] {
                        liberty_seen[n] = true;
                        liberties += 1;
                    }
                } else if self.points[n] == color && !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
        liberties
    }

    fn violates_superko(&self, prospective_hash: u64) -> bool {
        if self.rules.ko_rule != KoRule::PositionalSuperko {
            return false;
        }
        self.seen_positions.contains(&prospective_hash)
    }

    fn place_stone(&mut self, vertex: usize, color: PointState) {
        self.points[vertex] = color;
        match color {
            PointState::Black => self.position_hash ^= self.zobrist.black_key(vertex),
            PointState::White => self.position_hash ^= self.zobrist.white_key(vertex),
            PointState::Empty => {}
        }
    }

    fn remove_stone(&mut self, vertex: usize) {
        match self.points[vertex] {
            PointState::Black => self.position_hash ^= self.zobrist.black_key(vertex),
            PointState::White => self.position_hash ^= self.zobrist.white_key(vertex),
            PointState::Empty => {}
        }
        self.points[vertex] = PointState::Empty;
    }

    /// The ko vertex participates in the position hash with its own key, so
    /// ko-differentiated repetitions hash as distinct positions.
    fn set_ko(&mut self, vertex: Option<usize>) {
        if let Some(old) = self.ko_vertex {
            self.position_hash ^= self.zobrist.ko_key(old);
        }
        self.ko_vertex = vertex;
        if let Some(new) = self.ko_vertex {
            self.position_hash ^= self.zobrist.ko_key(new);
        }
    }
}
