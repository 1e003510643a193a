//! Benchmark-only crate; see `benches/` for the Criterion targets.
