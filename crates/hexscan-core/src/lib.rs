//! Core library for Intel HEX decoding and validation.
//!
//! This crate implements the decode pipeline used by the CLI: line sources
//! feed the stream validator, which drives the record decoder
//! (layout/reader/parser) and collects the results into a deterministic
//! report. Decoding is byte-oriented and side-effect free; all I/O is
//! isolated in `source` modules. Record framing conventions are captured in
//! the reader so the parser stays minimal.
//!
//! Invariants:
//! - A `Record` is either fully decoded and checksum-correct or rejected;
//!   callers never observe a partially-valid record.
//! - The first diagnostic aborts a decode; no partial record list accompanies
//!   an error.
//! - A decode succeeds only when exactly one end-of-file record terminates
//!   the stream and nothing but blank lines follows it.
//!
//! # Examples
//! ```
//! use hexscan_core::{RecordType, decode_str};
//!
//! let records = decode_str(":0B0010006164647265737320676170A7\n:00000001FF\n")?;
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].record_type, RecordType::Data);
//! # Ok::<(), hexscan_core::LineIssue>(())
//! ```

use serde::{Deserialize, Serialize};

mod record;
mod source;
mod stream;

pub use record::{Record, RecordError, RecordField, RecordType, checksum_of, parse_record};
pub use source::{
    FileLineSource, LineSource, LineTransform, ReadLineSource, SourceError, TransformSource,
};
pub use stream::{
    DATA_AFTER_EOF, DecodeError, EOF_MISSING, IssueKind, LineIssue, Validator, decode_hex_file,
    decode_lines, decode_source, decode_str, sanitize,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the caller does not stamp the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded-file report with deterministic ordering.
///
/// # Examples
/// ```
/// use hexscan_core::make_report;
///
/// let report = make_report("firmware.hex", 88, &[]);
/// assert_eq!(report.report_version, hexscan_core::REPORT_VERSION);
/// assert!(report.records.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input file metadata.
    pub input: InputInfo,

    /// Stream-level totals.
    pub summary: DecodeSummary,
    /// Decoded records in input order.
    pub records: Vec<RecordSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "hexscan").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes (0 when the input was streamed).
    pub bytes: u64,
}

/// Stream-level decode totals.
///
/// Address bounds cover data-record payloads only and are absent when the
/// file carries no data records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Total record count, end-of-file record included.
    pub records_total: u64,
    /// Total payload bytes across all records.
    pub data_bytes: u64,
    /// Lowest address covered by a data-record payload byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_min: Option<u32>,
    /// Highest address covered by a data-record payload byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_max: Option<u32>,
}

/// Single decoded record, flattened for serialization.
///
/// # Examples
/// ```
/// use hexscan_core::{decode_str, make_report};
///
/// let records = decode_str(":00000001FF\n").unwrap();
/// let report = make_report("firmware.hex", 12, &records);
/// assert_eq!(report.records[0].kind, "end_of_file");
/// assert_eq!(report.records[0].checksum, 0xFF);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSummary {
    /// Record type name (e.g., "data", "end_of_file").
    pub kind: String,
    /// Raw record type code.
    pub code: u8,
    /// 16-bit load address.
    pub address: u16,
    /// Declared payload length in bytes.
    pub byte_count: u8,
    /// Payload as lowercase hex, omitted when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    /// Checksum byte as parsed from the line.
    pub checksum: u8,
}

/// Build a report over an already-decoded record sequence.
///
/// # Examples
/// ```
/// use hexscan_core::{decode_str, make_report};
///
/// let records = decode_str(":0B0010006164647265737320676170A7\n:00000001FF\n").unwrap();
/// let report = make_report("firmware.hex", 46, &records);
/// assert_eq!(report.summary.records_total, 2);
/// assert_eq!(report.summary.address_min, Some(0x10));
/// assert_eq!(report.summary.address_max, Some(0x1A));
/// ```
pub fn make_report(input_path: &str, input_bytes: u64, records: &[Record]) -> Report {
    let mut data_bytes = 0u64;
    let mut address_min: Option<u32> = None;
    let mut address_max: Option<u32> = None;
    for record in records {
        data_bytes += record.data.len() as u64;
        if record.record_type != RecordType::Data || record.data.is_empty() {
            continue;
        }
        let start = record.address as u32;
        let end = start + record.data.len() as u32 - 1;
        address_min = Some(address_min.map_or(start, |min| min.min(start)));
        address_max = Some(address_max.map_or(end, |max| max.max(end)));
    }

    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "hexscan".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: DecodeSummary {
            records_total: records.len() as u64,
            data_bytes,
            address_min,
            address_max,
        },
        records: records.iter().map(summarize_record).collect(),
    }
}

fn summarize_record(record: &Record) -> RecordSummary {
    RecordSummary {
        kind: record.record_type.name().to_string(),
        code: record.record_type.code(),
        address: record.address,
        byte_count: record.byte_count,
        data: record.data.iter().map(|byte| format!("{byte:02x}")).collect(),
        checksum: record.checksum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_absent() {
        let records = decode_str(":00000001FF\n").expect("decode");
        let report = make_report("firmware.hex", 12, &records);

        let value = serde_json::to_value(&report).expect("report json");
        let summary = value.get("summary").expect("summary");
        assert!(summary.get("address_min").is_none());
        assert!(summary.get("address_max").is_none());

        let record = &value["records"][0];
        assert!(record.get("data").is_none());
        assert_eq!(record["kind"], "end_of_file");
        assert_eq!(record["checksum"], 255);
    }

    #[test]
    fn report_summarizes_data_records() {
        let records = decode_str(":0B0010006164647265737320676170A7\n:00000001FF\n").expect("decode");
        let report = make_report("firmware.hex", 46, &records);

        assert_eq!(report.summary.records_total, 2);
        assert_eq!(report.summary.data_bytes, 11);
        assert_eq!(report.summary.address_min, Some(0x10));
        assert_eq!(report.summary.address_max, Some(0x1A));
        assert_eq!(report.records[0].data, "6164647265737320676170");
    }

    #[test]
    fn report_round_trips_through_json() {
        let records = decode_str(":00000001FF\n").expect("decode");
        let report = make_report("firmware.hex", 12, &records);
        let json = serde_json::to_string(&report).expect("serialize");
        let parsed: Report = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.summary.records_total, 1);
        assert!(parsed.records[0].data.is_empty());
    }
}
