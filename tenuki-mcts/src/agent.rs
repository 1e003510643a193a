//! The PUCT search agent: simulation loop, expansion, backup, root
//! selection, Dirichlet noise, and tree reuse across moves.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rand::distributions::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::evaluator::{Evaluator, UniformEvaluator};
use crate::node::{Edge, Node, NodeBody};
use tenuki_core::{Board, Move, Player, PointState};

const EPSILON: f32 = 1e-8;
/// Negligible uniform jitter added to PUCT scores so exact ties do not
/// always resolve to the lowest index.
const TIE_BREAK: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Fixed playout budget when cap randomization is off.
    pub max_playouts: u32,
    /// Sample the playout budget uniformly per `select_move` call.
    pub enable_playout_cap_randomization: bool,
    pub random_playouts_min: u32,
    pub random_playouts_max: u32,
    /// PUCT exploration constant.
    pub cpuct: f32,
    /// First-play-urgency reduction from the parent Q for unvisited edges.
    pub fpu_reduction: f32,
    /// Symmetric Dirichlet parameter for root noise.
    pub dirichlet_alpha: f32,
    /// Mixing weight of noise into root priors; 0 disables noise.
    pub dirichlet_epsilon: f32,
    /// Sampling temperature for early-game root selection.
    pub temperature: f32,
    /// Move number at which the temperature drops to 0 (argmax).
    pub temperature_move_cutoff: u32,
    /// Parallel simulation workers; 1 runs everything on the caller.
    pub num_threads: usize,
    pub use_virtual_loss: bool,
    pub virtual_loss: f32,
    pub virtual_loss_visits: i64,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_playouts: 256,
            enable_playout_cap_randomization: true,
            random_playouts_min: 192,
            random_playouts_max: 384,
            cpuct: 1.6,
            fpu_reduction: 0.2,
            dirichlet_alpha: 0.03,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
            temperature_move_cutoff: 30,
            num_threads: 1,
            use_virtual_loss: true,
            virtual_loss: 1.0,
            virtual_loss_visits: 1,
            seed: 0x5eed_1234,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchConfigError {
    #[error("invalid search config: {msg}")]
    InvalidConfig { msg: &'static str },
}

/// Aggregate root statistics after a `select_move` call, for reporting.
#[derive(Debug, Clone, Copy)]
pub struct RootSummary {
    pub visit_count: i64,
    pub value: f32,
}

pub struct SearchAgent {
    pub(crate) config: SearchConfig,
    pub(crate) evaluator: Arc<dyn Evaluator>,
    pub(crate) root: Option<Arc<Node>>,
    pub(crate) root_hash: u64,
    pub(crate) root_ready: bool,
    pub(crate) rng: ChaCha8Rng,
}

impl SearchAgent {
    pub fn new(
        config: SearchConfig,
        evaluator: Arc<dyn Evaluator>,
    ) -> Result<Self, SearchConfigError> {
        if !(config.cpuct.is_finite() && config.cpuct > 0.0) {
            return Err(SearchConfigError::InvalidConfig {
                msg: "cpuct must be finite and > 0",
            });
        }
        if !(config.fpu_reduction.is_finite() && config.fpu_reduction >= 0.0) {
            return Err(SearchConfigError::InvalidConfig {
                msg: "fpu_reduction must be finite and >= 0",
            });
        }
        if !(config.dirichlet_epsilon.is_finite() && (0.0..=1.0).contains(&config.dirichlet_epsilon))
        {
            return Err(SearchConfigError::InvalidConfig {
                msg: "dirichlet_epsilon must be in [0, 1]",
            });
        }
        if config.dirichlet_epsilon > 0.0
            && !(config.dirichlet_alpha.is_finite() && config.dirichlet_alpha > 0.0)
        {
            return Err(SearchConfigError::InvalidConfig {
                msg: "dirichlet_alpha must be finite and > 0 when noise is enabled",
            });
        }
        if !(config.temperature.is_finite() && config.temperature >= 0.0) {
            return Err(SearchConfigError::InvalidConfig {
                msg: "temperature must be finite and >= 0",
            });
        }
        if !(config.virtual_loss.is_finite() && config.virtual_loss >= 0.0) {
            return Err(SearchConfigError::InvalidConfig {
                msg: "virtual_loss must be finite and >= 0",
            });
        }
        if config.virtual_loss_visits < 0 {
            return Err(SearchConfigError::InvalidConfig {
                msg: "virtual_loss_visits must be >= 0",
            });
        }

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            evaluator,
            root: None,
            root_hash: 0,
            root_ready: false,
        })
    }

    pub fn with_uniform_evaluator(config: SearchConfig) -> Result<Self, SearchConfigError> {
        Self::new(config, Arc::new(UniformEvaluator))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the configured playout budget from `board` and pick a move for
    /// `to_play`. The board itself is never mutated; every simulation works
    /// on its own copy.
    pub fn select_move(&mut self, board: &Board, to_play: Player, move_number: u32) -> Move {
        let root = self.ensure_root(board, to_play);
        let playouts = self.choose_playout_budget();

        let threads = self.config.num_threads.max(1);
        if threads <= 1 {
            for _ in 0..playouts {
                simulate(
                    &self.config,
                    self.evaluator.as_ref(),
                    &root,
                    board,
                    &mut self.rng,
                );
            }
        } else {
            let config = self.config;
            let counter = AtomicU32::new(0);
            std::thread::scope(|scope| {
                for thread_index in 0..threads {
                    let root = Arc::clone(&root);
                    let evaluator = Arc::clone(&self.evaluator);
                    let counter = &counter;
                    scope.spawn(move || {
                        let mut rng = ChaCha8Rng::seed_from_u64(worker_seed(
                            config.seed,
                            thread_index,
                            move_number,
                            playouts,
                        ));
                        loop {
                            let index = counter.fetch_add(1, Ordering::Relaxed);
                            if index >= playouts {
                                break;
                            }
                            simulate(&config, evaluator.as_ref(), &root, board, &mut rng);
                        }
                    });
                }
            });
        }

        self.select_move_from_root(move_number)
    }

    /// Promote the child reached by `mv` to be the new root, dropping all
    /// siblings. If no such subtree exists the whole tree is dropped and
    /// the next `select_move` starts fresh.
    pub fn notify_move(&mut self, mv: Move, board_after_move: &Board, to_play: Player) {
        let new_hash = board_after_move.state_key();

        let root = match (&self.root, self.root_ready) {
            (Some(root), true) => Arc::clone(root),
            _ => {
                self.root_hash = new_hash;
                self.root_ready = false;
                return;
            }
        };

        let mut next: Option<Arc<Node>> = None;
        {
            let mut body = root.body();
            if let Some(&index) = body.move_to_index.get(&mv) {
                next = body.children[index].child.take();
            }
        }

        match next {
            Some(next_root) => {
                {
                    let mut body = next_root.body();
                    body.to_play = to_play;
                    body.noise_applied = false;
                    body.virtual_loss_count = 0;
                    for edge in &mut body.children {
                        edge.virtual_loss_count = 0;
                    }
                }
                self.root = Some(next_root);
                self.root_hash = new_hash;
                self.root_ready = true;
            }
            None => {
                self.root = None;
                self.root_hash = new_hash;
                self.root_ready = false;
            }
        }
    }

    /// Drop the tree entirely.
    pub fn reset(&mut self) {
        self.root = None;
        self.root_hash = 0;
        self.root_ready = false;
    }

    /// Root statistics of the last search, if a root exists.
    pub fn root_summary(&self) -> Option<RootSummary> {
        let root = self.root.as_ref()?;
        let body = root.body();
        let value = if body.visit_count > 0 {
            body.value_sum / body.visit_count as f32
        } else {
            0.0
        };
        Some(RootSummary {
            visit_count: body.visit_count,
            value,
        })
    }

    fn ensure_root(&mut self, board: &Board, to_play: Player) -> Arc<Node> {
        let key = board.state_key();

        let root = match &self.root {
            Some(root) if self.root_ready && self.root_hash == key => {
                root.body().to_play = to_play;
                Arc::clone(root)
            }
            _ => {
                let root = Arc::new(Node::new(to_play));
                self.root = Some(Arc::clone(&root));
                self.root_hash = key;
                self.root_ready = true;
                root
            }
        };

        let expanded = root.body().expanded;
        if !expanded {
            // The expansion value is not backed up here; only simulations
            // contribute to the root statistics.
            try_expand(self.evaluator.as_ref(), &root, board);
        }

        if self.config.dirichlet_epsilon > 0.0 {
            let needs_noise = {
                let mut body = root.body();
                if !body.noise_applied && !body.children.is_empty() {
                    body.noise_applied = true;
                    true
                } else {
                    false
                }
            };
            if needs_noise {
                apply_dirichlet_noise(&self.config, &root, &mut self.rng);
            }
        }

        root
    }

    fn choose_playout_budget(&mut self) -> u32 {
        let mut playouts = self.config.max_playouts.max(1);
        if self.config.enable_playout_cap_randomization
            && self.config.random_playouts_max > self.config.random_playouts_min
        {
            playouts = self
                .rng
                .gen_range(self.config.random_playouts_min..=self.config.random_playouts_max);
        }
        playouts
    }

    pub(crate) fn select_move_from_root(&mut self, move_number: u32) -> Move {
        let root = match &self.root {
            Some(root) => Arc::clone(root),
            None => return Move::Pass,
        };
        let body = root.body();
        if body.children.is_empty() {
            return Move::Pass;
        }

        let mut temperature = self.config.temperature;
        if move_number >= self.config.temperature_move_cutoff {
            temperature = 0.0;
        }

        if temperature <= EPSILON {
            let mut best_index = 0usize;
            let mut best_visits = i64::MIN;
            for (index, edge) in body.children.iter().enumerate() {
                if edge.visit_count > best_visits {
                    best_visits = edge.visit_count;
                    best_index = index;
                }
            }
            return body.children[best_index].mv;
        }

        let mut weights: Vec<f32> = body
            .children
            .iter()
            .map(|edge| (edge.visit_count as f32 + EPSILON).powf(1.0 / temperature))
            .collect();
        let sum: f32 = weights.iter().sum();
        if sum <= EPSILON {
            let uniform = 1.0 / weights.len() as f32;
            weights.fill(uniform);
        } else {
            for w in &mut weights {
                *w /= sum;
            }
        }

        let index = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0,
        };
        body.children[index].mv
    }
}

/// Derive a per-worker PRNG seed from the agent seed, the worker index,
/// and the call context, so fixed thread counts replay identically.
fn worker_seed(seed: u64, thread_index: usize, move_number: u32, playouts: u32) -> u64 {
    let mix = (thread_index as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    seed ^ mix ^ (((move_number as u64) << 32) | playouts as u64)
}

/// One playout: descend by PUCT from the root on a private board copy,
/// expand the first unexpanded node (or treat a childless node as
/// terminal), and back the value up the visited path.
fn simulate(
    config: &SearchConfig,
    evaluator: &dyn Evaluator,
    root: &Arc<Node>,
    root_board: &Board,
    rng: &mut ChaCha8Rng,
) {
    let mut board = root_board.clone();
    let mut current = Arc::clone(root);
    let mut path: Vec<Arc<Node>> = vec![Arc::clone(root)];
    let mut edge_indices: Vec<usize> = Vec::new();

    loop {
        if let Some(value) = try_expand(evaluator, &current, &board) {
            backpropagate(config, &path, &edge_indices, value);
            return;
        }

        let (child_index, mover, mv, child) = {
            let mut body = current.body();
            if body.children.is_empty() {
                drop(body);
                backpropagate(config, &path, &edge_indices, 0.0);
                return;
            }
            let child_index = select_child(config, &mut body, rng);
            let mover = body.to_play;
            let next_to_play = mover.other();
            let edge = &mut body.children[child_index];
            let child = Arc::clone(
                edge.child
                    .get_or_insert_with(|| Arc::new(Node::new(next_to_play))),
            );
            (child_index, mover, edge.mv, child)
        };

        if !board.play_move(mover, mv) {
            // Children are pre-filtered for legality at expansion time, but
            // the ko/superko context can differ at this depth. Prune the
            // stale edge and pick again.
            let mut body = current.body();
            revert_virtual_loss(config, &mut body, child_index);
            let edge = &mut body.children[child_index];
            edge.prior = 0.0;
            edge.visit_count = 0;
            edge.value_sum = 0.0;
            edge.child = None;
            continue;
        }

        path.push(Arc::clone(&child));
        edge_indices.push(child_index);
        current = child;
    }
}

/// Expand `node` against `board` if it is not already expanded. Returns the
/// evaluator's value when this call performed the expansion, `None` when the
/// node was (or concurrently became) expanded.
///
/// Only one thread evaluates a given node; latecomers wait on the node's
/// condvar and then proceed as if it had always been expanded. The
/// evaluator runs outside any lock.
fn try_expand(evaluator: &dyn Evaluator, node: &Node, board: &Board) -> Option<f32> {
    let to_play = {
        let mut body = node.body();
        if body.expanded {
            return None;
        }
        while body.expanding {
            body = node.wait_expansion(body);
            if body.expanded {
                return None;
            }
        }
        body.expanding = true;
        body.to_play
    };

    let evaluation = evaluator.evaluate(board, to_play);
    let area = board.board_size() * board.board_size();
    let expected_len = area + 1;
    let mut policy = evaluation.policy;
    if policy.len() != expected_len {
        policy = vec![1.0 / expected_len as f32; expected_len];
    }

    let mut moves: Vec<Move> = Vec::with_capacity(expected_len);
    let mut priors: Vec<f32> = Vec::with_capacity(expected_len);
    let mut prior_sum = 0.0f64;
    for vertex in 0..area {
        if board.point_state(vertex) != PointState::Empty {
            continue;
        }
        if !board.is_legal(to_play, Move::Play(vertex)) {
            continue;
        }
        let prior = policy[vertex].max(0.0);
        moves.push(Move::Play(vertex));
        priors.push(prior);
        prior_sum += prior as f64;
    }
    let pass_prior = policy[area].max(0.0);
    moves.push(Move::Pass);
    priors.push(pass_prior);
    prior_sum += pass_prior as f64;

    if prior_sum <= EPSILON as f64 {
        let uniform = 1.0 / priors.len() as f32;
        priors.fill(uniform);
    } else {
        for prior in &mut priors {
            *prior = (*prior as f64 / prior_sum) as f32;
        }
    }

    let mut children = Vec::with_capacity(moves.len());
    let mut move_to_index = FxHashMap::default();
    for (index, (&mv, &prior)) in moves.iter().zip(priors.iter()).enumerate() {
        move_to_index.insert(mv, index);
        children.push(Edge {
            mv,
            prior,
            value_sum: 0.0,
            visit_count: 0,
            virtual_loss_count: 0,
            child: None,
        });
    }

    {
        let mut body = node.body();
        body.children = children;
        body.move_to_index = move_to_index;
        body.expanded = true;
        body.noise_applied = false;
        body.expanding = false;
    }
    node.notify_expansion();

    Some(evaluation.value)
}

/// PUCT argmax over the node's edges. Does not mutate statistics.
fn puct_best_index(config: &SearchConfig, body: &NodeBody, rng: &mut ChaCha8Rng) -> usize {
    let sqrt_total = (body.visit_count as f32 + 1.0).sqrt();
    let parent_q = if body.visit_count > 0 {
        body.value_sum / body.visit_count as f32
    } else {
        0.0
    };

    let mut best_score = f32::NEG_INFINITY;
    let mut best_index = 0usize;
    for (index, edge) in body.children.iter().enumerate() {
        let q = if edge.visit_count > 0 {
            edge.q()
        } else {
            parent_q - config.fpu_reduction
        }
        .clamp(-1.0, 1.0);
        let u = config.cpuct * edge.prior * sqrt_total / (1.0 + edge.visit_count as f32);
        let score = q + u + TIE_BREAK * rng.gen::<f32>();
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }
    best_index
}

/// Pick an edge by PUCT and immediately apply virtual loss to it and to the
/// node, both under the caller's lock.
fn select_child(config: &SearchConfig, body: &mut NodeBody, rng: &mut ChaCha8Rng) -> usize {
    let best_index = puct_best_index(config, body, rng);
    apply_virtual_loss(config, body, best_index);
    best_index
}

fn apply_virtual_loss(config: &SearchConfig, body: &mut NodeBody, child_index: usize) {
    if !config.use_virtual_loss {
        return;
    }
    let edge = &mut body.children[child_index];
    edge.virtual_loss_count += 1;
    edge.visit_count += config.virtual_loss_visits;
    edge.value_sum -= config.virtual_loss;
    body.virtual_loss_count += 1;
    body.visit_count += config.virtual_loss_visits;
    body.value_sum -= config.virtual_loss;
}

fn revert_virtual_loss(config: &SearchConfig, body: &mut NodeBody, child_index: usize) {
    if !config.use_virtual_loss {
        return;
    }
    let edge = &mut body.children[child_index];
    if edge.virtual_loss_count > 0 {
        edge.virtual_loss_count -= 1;
        edge.visit_count = (edge.visit_count - config.virtual_loss_visits).max(0);
        edge.value_sum += config.virtual_loss;
    }
    if body.virtual_loss_count > 0 {
        body.virtual_loss_count -= 1;
        body.visit_count = (body.visit_count - config.virtual_loss_visits).max(0);
        body.value_sum += config.virtual_loss;
    }
}

/// Walk the path leaf-to-root, adding the signed value to each node and to
/// the edge above it, reverting one unit of virtual loss as added. The sign
/// flips between plies because values are from the to-move perspective.
fn backpropagate(config: &SearchConfig, path: &[Arc<Node>], edge_indices: &[usize], value: f32) {
    let mut current_value = value;
    for index in (0..path.len()).rev() {
        {
            let mut body = path[index].body();
            if config.use_virtual_loss && body.virtual_loss_count > 0 {
                body.virtual_loss_count -= 1;
                body.visit_count = (body.visit_count - config.virtual_loss_visits).max(0);
                body.value_sum += config.virtual_loss;
            }
            body.visit_count += 1;
            body.value_sum += current_value;
        }
        if index > 0 {
            let mut body = path[index - 1].body();
            let edge = &mut body.children[edge_indices[index - 1]];
            if config.use_virtual_loss && edge.virtual_loss_count > 0 {
                edge.virtual_loss_count -= 1;
                edge.visit_count = (edge.visit_count - config.virtual_loss_visits).max(0);
                edge.value_sum += config.virtual_loss;
            }
            edge.visit_count += 1;
            edge.value_sum += current_value;
        }
        current_value = -current_value;
    }
}

/// Blend symmetric Dirichlet noise into the node's priors (root only, once
/// per root lifetime). Noise is sampled as normalized Gamma draws; a
/// degenerate sum falls back to uniform noise.
fn apply_dirichlet_noise(config: &SearchConfig, node: &Node, rng: &mut ChaCha8Rng) {
    let mut body = node.body();
    if body.children.is_empty() {
        return;
    }

    let count = body.children.len();
    let noise = match Gamma::new(config.dirichlet_alpha, 1.0) {
        Ok(gamma) => {
            let mut noise: Vec<f32> = (0..count).map(|_| gamma.sample(rng)).collect();
            let sum: f32 = noise.iter().sum();
            if sum <= EPSILON {
                let uniform = 1.0 / count as f32;
                noise.fill(uniform);
            } else {
                for value in &mut noise {
                    *value /= sum;
                }
            }
            noise
        }
        Err(_) => vec![1.0 / count as f32; count],
    };

    for (edge, eta) in body.children.iter_mut().zip(noise) {
        edge.prior = edge.prior * (1.0 - config.dirichlet_epsilon) + config.dirichlet_epsilon * eta;
    }
}

/// Criterion entry point: one PUCT selection over a prepared node body,
/// without mutating its statistics.
pub fn bench_select_child(config: &SearchConfig, body: &NodeBody, rng: &mut ChaCha8Rng) -> usize {
    puct_best_index(config, body, rng)
}
