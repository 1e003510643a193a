//! tenuki-sgf: reader/writer for a minimal SGF subset.
//!
//! Supported: root properties `SZ` and `KM`, sequential move nodes
//! `;B[xy]` / `;W[xy]` with two lowercase coordinate letters, empty
//! brackets for a pass. Loading is best-effort and never fails; saving
//! only fails when a vertex does not fit the board.

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::load;
pub use record::{GameTree, MoveRecord};
pub use writer::{save, SgfError};

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
