//! Intel HEX record decoding.
//!
//! The module follows a layered structure:
//! - `layout`: digit offsets and type codes within a record body (source of truth)
//! - `reader`: safe hex-pair access over the line
//! - `parser`: record-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! The parser is pure and contains no I/O; line supply and stream-level
//! validation live in the `source` and `stream` modules.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::{RecordError, RecordField};
pub use parser::{Record, RecordType, checksum_of, parse_record};
