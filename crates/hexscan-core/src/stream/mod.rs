//! Stream validation: drives the sanitizer and the record decoder across a
//! line sequence and enforces end-of-file record placement.
//!
//! Decoding is fail-fast: the first diagnostic aborts the decode and no
//! partial record list is returned alongside it. Processing is strictly
//! line-sequential; the validator holds the only mutable state.

mod sanitize;
mod validate;

pub mod error;

pub use error::{DATA_AFTER_EOF, EOF_MISSING, IssueKind, LineIssue};
pub use sanitize::sanitize;
pub use validate::Validator;

use std::path::Path;

use thiserror::Error;

use crate::record::Record;
use crate::source::{FileLineSource, LineSource, SourceError};
use crate::{Report, make_report};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Line(#[from] LineIssue),
}

/// Decode every line a source yields.
pub fn decode_source<S: LineSource>(mut source: S) -> Result<Vec<Record>, LineIssue> {
    let mut validator = Validator::new();
    loop {
        match source.next_line() {
            Ok(Some(raw)) => validator.feed(&raw)?,
            // A failed read is end of input; `finish` reports the missing
            // EOF record if one was still outstanding.
            Ok(None) | Err(_) => break,
        }
    }
    validator.finish()
}

/// Decode an in-memory sequence of raw lines.
pub fn decode_lines<I, L>(lines: I) -> Result<Vec<Record>, LineIssue>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut validator = Validator::new();
    for raw in lines {
        validator.feed(raw.as_ref())?;
    }
    validator.finish()
}

/// Decode a full file's worth of text.
///
/// # Examples
/// ```
/// use hexscan_core::decode_str;
///
/// let records = decode_str(":00000001FF\n")?;
/// assert_eq!(records.len(), 1);
/// # Ok::<(), hexscan_core::LineIssue>(())
/// ```
pub fn decode_str(input: &str) -> Result<Vec<Record>, LineIssue> {
    // split_inclusive keeps line numbering identical to the byte sources:
    // a trailing newline does not manufacture an extra empty line.
    decode_lines(input.split_inclusive('\n'))
}

/// Decode a hex file from disk and build its report.
pub fn decode_hex_file(path: &Path) -> Result<Report, DecodeError> {
    let source = FileLineSource::open(path)?;
    let records = decode_source(source)?;
    let bytes = path.metadata()?.len();
    Ok(make_report(&path.display().to_string(), bytes, &records))
}
