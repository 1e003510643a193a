//! tenuki-gtp: line-oriented GTP v2 front end.
//!
//! Commands are case-insensitive with an optional leading numeric id that
//! is echoed back; responses start with `=` (success) or `?` (failure) and
//! end with a blank line.

pub mod server;
pub mod vertex;

pub use server::{Server, ServerError};
pub use vertex::{format_vertex, parse_vertex};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod vertex_tests;
