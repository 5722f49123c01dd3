use thiserror::Error;

use crate::record::RecordError;

/// Diagnostic text for a stream that runs out before the EOF record.
pub const EOF_MISSING: &str = "end of file without EOF record";
/// Diagnostic text for content following the EOF record.
pub const DATA_AFTER_EOF: &str = "data after EOF record";

/// The four terminal diagnostic kinds. None of them is retried internally;
/// the first one encountered ends the decode.
#[derive(Debug, Error)]
pub enum IssueKind {
    #[error("NULL before end of line")]
    NullByte,
    #[error("Error decoding record: {detail}")]
    MalformedSyntax { detail: String },
    #[error("Mismatched checksum: expected {expected:02X}, found {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("{detail}")]
    UnexpectedEndOfFile { detail: &'static str },
}

impl From<RecordError> for IssueKind {
    fn from(value: RecordError) -> Self {
        match value {
            RecordError::ChecksumMismatch { expected, actual } => {
                IssueKind::ChecksumMismatch { expected, actual }
            }
            other => IssueKind::MalformedSyntax {
                detail: other.to_string(),
            },
        }
    }
}

/// A diagnostic tied to a 1-based line number.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct LineIssue {
    pub line: usize,
    pub kind: IssueKind,
}
