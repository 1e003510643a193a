//! Search tree nodes, edges, and their statistics.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use tenuki_core::{Move, Player};

/// One child edge: the move leading to the child, its prior, aggregated
/// backup statistics, virtual-loss bookkeeping, and exclusive ownership of
/// the child node (allocated lazily on first traversal).
pub struct Edge {
    pub mv: Move,
    pub prior: f32,
    pub value_sum: f32,
    pub visit_count: i64,
    pub virtual_loss_count: i64,
    pub child: Option<Arc<Node>>,
}

impl Edge {
    pub fn q(&self) -> f32 {
        if self.visit_count > 0 {
            self.value_sum / self.visit_count as f32
        } else {
            0.0
        }
    }
}

/// Everything mutable on a node, guarded by the node's mutex.
pub struct NodeBody {
    pub to_play: Player,
    pub expanded: bool,
    /// Set while one thread runs the evaluator for this node; other
    /// arrivals wait on the node's condvar.
    pub expanding: bool,
    pub noise_applied: bool,
    pub visit_count: i64,
    pub value_sum: f32,
    pub virtual_loss_count: i64,
    pub children: Vec<Edge>,
    pub move_to_index: FxHashMap<Move, usize>,
}

pub struct Node {
    body: Mutex<NodeBody>,
    expansion_done: Condvar,
}

impl Node {
    pub fn new(to_play: Player) -> Self {
        Self {
            body: Mutex::new(NodeBody {
                to_play,
                expanded: false,
                expanding: false,
                noise_applied: false,
                visit_count: 0,
                value_sum: 0.0,
                virtual_loss_count: 0,
                children: Vec::new(),
                move_to_index: FxHashMap::default(),
            }),
            expansion_done: Condvar::new(),
        }
    }

    /// Lock the node body. A poisoned lock only means another worker
    /// panicked mid-update; the statistics are still usable, so recover
    /// the guard instead of propagating the panic.
    pub fn body(&self) -> MutexGuard<'_, NodeBody> {
        self.body.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a concurrent expansion of this node finishes. Returns
    /// the re-acquired guard.
    pub fn wait_expansion<'a>(&'a self, guard: MutexGuard<'a, NodeBody>) -> MutexGuard<'a, NodeBody> {
        self.expansion_done
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notify_expansion(&self) {
        self.expansion_done.notify_all();
    }
}
