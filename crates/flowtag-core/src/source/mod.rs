//! Line sources feeding the classification pipeline.
//!
//! A source yields one flow-log line at a time and reuses its buffer, so a
//! flow log is never held in memory in full. Sources are single-pass and
//! forward-only.

mod file;
mod lines;

pub use file::FlowLogFileSource;
pub use lines::BufReadSource;

use thiserror::Error;

/// Pull-based, single-pass sequence of text lines.
pub trait LineSource {
    /// Return the next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<&str>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
