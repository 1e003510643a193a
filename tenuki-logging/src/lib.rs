//! tenuki-logging: NDJSON event records for engine runs.
//!
//! Append-only one-object-per-line logs so a session can be inspected
//! after the fact without any tooling beyond `jq`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log schema versioning fields.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub protocol_version: u32,
    pub ruleset_id: &'static str,
}

impl Default for VersionInfoV1 {
    fn default() -> Self {
        Self {
            protocol_version: 1,
            ruleset_id: "tromp-taylor-v1",
        }
    }
}

/// One record per `genmove`: what the search chose and how hard it worked.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRootEventV1 {
    pub event: &'static str,
    pub v: VersionInfoV1,

    pub game_ply: u32,
    pub to_play: &'static str,
    pub chosen_move: String,
    pub root_visits: i64,
    pub root_value: f32,
    pub elapsed_us: u64,
}

/// Game lifecycle record (board reset, size or komi change).
#[derive(Debug, Clone, Serialize)]
pub struct GameEventV1 {
    pub event: &'static str,
    pub v: VersionInfoV1,

    pub board_size: usize,
    pub komi: f64,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
