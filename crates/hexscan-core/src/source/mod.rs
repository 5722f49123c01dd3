//! Line supply for the decoder.
//!
//! Sources isolate all I/O from the decode path: they yield raw lines,
//! terminators included, and report failures through `SourceError`. The
//! transform seam lets callers splice a per-line rewriting step between a
//! source and the validator without the core ever spawning processes.

mod file;
mod transform;

pub use file::{FileLineSource, ReadLineSource};
pub use transform::{LineTransform, TransformSource};

use thiserror::Error;

/// Ordered supplier of raw input lines.
pub trait LineSource {
    /// Next raw line, or `None` once the input is exhausted.
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transform error: {0}")]
    Transform(String),
}
