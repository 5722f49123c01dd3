use std::fmt;

use thiserror::Error;

/// Field of a record, used to point at where a structural failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    ByteCount,
    Address,
    RecordType,
    Data,
    Checksum,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::ByteCount => "byte count",
            RecordField::Address => "address",
            RecordField::RecordType => "record type",
            RecordField::Data => "data",
            RecordField::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing ':' start code")]
    MissingStartCode,
    #[error("odd number of hex digits ({digits})")]
    OddDigitCount { digits: usize },
    #[error("truncated record: {field} needs {needed} hex digits, got {actual}")]
    Truncated {
        field: RecordField,
        needed: usize,
        actual: usize,
    },
    #[error("invalid hex digit {digit:?} in {field}")]
    InvalidHexDigit { field: RecordField, digit: char },
    #[error("{extra} trailing characters after checksum")]
    TrailingCharacters { extra: usize },
    #[error("Mismatched checksum: expected {expected:02X}, found {actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}
