//! tenuki-mcts: PUCT Monte Carlo tree search for Go.
//!
//! The design uses:
//! - A pluggable [`Evaluator`] (policy over `board_size² + 1` moves plus a
//!   value in `[-1, 1]`), with [`UniformEvaluator`] as the reference
//!   implementation
//! - A uniquely-owned tree of nodes reached through owning edges, lazily
//!   allocated along selected paths and promoted across moves
//! - Virtual loss plus per-node expansion exclusivity for the parallel
//!   regime; board copies are thread-local per simulation

pub mod agent;
pub mod evaluator;
pub mod node;

pub use agent::{
    bench_select_child, RootSummary, SearchAgent, SearchConfig, SearchConfigError,
};
pub use evaluator::{Evaluation, Evaluator, UniformEvaluator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
