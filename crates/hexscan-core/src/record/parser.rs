use super::error::{RecordError, RecordField};
use super::layout;
use super::reader::RecordReader;

/// One decoded record line. Immutable once decoded: a `Record` only exists
/// after every field parsed and the checksum matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub byte_count: u8,
    pub address: u16,
    pub record_type: RecordType,
    pub data: Vec<u8>,
    pub checksum: u8,
}

impl Record {
    /// Checksum over the record's own fields, the way an encoder computes it.
    pub fn compute_checksum(&self) -> u8 {
        checksum_of(
            self.byte_count,
            self.address,
            self.record_type.code(),
            &self.data,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
    /// Out-of-range type code, carried through as an opaque data-bearing
    /// record rather than rejected here.
    Other(u8),
}

impl RecordType {
    pub fn from_code(code: u8) -> Self {
        match code {
            layout::DATA_TYPE => RecordType::Data,
            layout::EOF_TYPE => RecordType::EndOfFile,
            layout::EXT_SEGMENT_ADDRESS_TYPE => RecordType::ExtendedSegmentAddress,
            layout::START_SEGMENT_ADDRESS_TYPE => RecordType::StartSegmentAddress,
            layout::EXT_LINEAR_ADDRESS_TYPE => RecordType::ExtendedLinearAddress,
            layout::START_LINEAR_ADDRESS_TYPE => RecordType::StartLinearAddress,
            other => RecordType::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            RecordType::Data => layout::DATA_TYPE,
            RecordType::EndOfFile => layout::EOF_TYPE,
            RecordType::ExtendedSegmentAddress => layout::EXT_SEGMENT_ADDRESS_TYPE,
            RecordType::StartSegmentAddress => layout::START_SEGMENT_ADDRESS_TYPE,
            RecordType::ExtendedLinearAddress => layout::EXT_LINEAR_ADDRESS_TYPE,
            RecordType::StartLinearAddress => layout::START_LINEAR_ADDRESS_TYPE,
            RecordType::Other(code) => *code,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordType::Data => "data",
            RecordType::EndOfFile => "end_of_file",
            RecordType::ExtendedSegmentAddress => "extended_segment_address",
            RecordType::StartSegmentAddress => "start_segment_address",
            RecordType::ExtendedLinearAddress => "extended_linear_address",
            RecordType::StartLinearAddress => "start_linear_address",
            RecordType::Other(_) => "unknown",
        }
    }
}

/// Decode one sanitized line into a `Record`.
///
/// Fields are extracted in wire order; the checksum is compared only after
/// every field decoded structurally.
pub fn parse_record(line: &[u8]) -> Result<Record, RecordError> {
    let body = match line.split_first() {
        Some((&layout::START_CODE, body)) => body,
        _ => return Err(RecordError::MissingStartCode),
    };
    if body.len() % layout::DIGITS_PER_BYTE != 0 {
        return Err(RecordError::OddDigitCount { digits: body.len() });
    }

    let reader = RecordReader::new(body);
    let byte_count = reader.read_byte(layout::BYTE_COUNT_OFFSET, RecordField::ByteCount)?;
    let address = reader.read_u16(layout::ADDRESS_OFFSET, RecordField::Address)?;
    let type_code = reader.read_byte(layout::TYPE_OFFSET, RecordField::RecordType)?;

    let checksum_offset = layout::DATA_OFFSET + byte_count as usize * layout::DIGITS_PER_BYTE;
    reader.require_len(checksum_offset, RecordField::Data)?;
    reader.require_len(checksum_offset + layout::CHECKSUM_DIGITS, RecordField::Checksum)?;
    let record_end = checksum_offset + layout::CHECKSUM_DIGITS;
    if reader.digits() > record_end {
        return Err(RecordError::TrailingCharacters {
            extra: reader.digits() - record_end,
        });
    }

    let data = reader.read_bytes(layout::DATA_OFFSET, byte_count as usize, RecordField::Data)?;
    let checksum = reader.read_byte(checksum_offset, RecordField::Checksum)?;

    let expected = checksum_of(byte_count, address, type_code, &data);
    if expected != checksum {
        return Err(RecordError::ChecksumMismatch {
            expected,
            actual: checksum,
        });
    }

    Ok(Record {
        byte_count,
        address,
        record_type: RecordType::from_code(type_code),
        data,
        checksum,
    })
}

/// Two's-complement of the low byte of the field sum.
pub fn checksum_of(byte_count: u8, address: u16, type_code: u8, data: &[u8]) -> u8 {
    let [addr_high, addr_low] = address.to_be_bytes();
    let mut sum = byte_count
        .wrapping_add(addr_high)
        .wrapping_add(addr_low)
        .wrapping_add(type_code);
    for &byte in data {
        sum = sum.wrapping_add(byte);
    }
    sum.wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordType, checksum_of, parse_record};
    use crate::record::error::RecordError;

    #[test]
    fn parse_valid_data_record() {
        let record = parse_record(b":0B0010006164647265737320676170A7").unwrap();
        assert_eq!(record.byte_count, 0x0B);
        assert_eq!(record.address, 0x0010);
        assert_eq!(record.record_type, RecordType::Data);
        assert_eq!(record.data, b"address gap");
        assert_eq!(record.checksum, 0xA7);
    }

    #[test]
    fn parse_eof_record() {
        let record = parse_record(b":00000001FF").unwrap();
        assert_eq!(record.record_type, RecordType::EndOfFile);
        assert!(record.data.is_empty());
        assert_eq!(record.checksum, 0xFF);
    }

    #[test]
    fn parse_extended_linear_address_record() {
        let record = parse_record(b":020000040800F2").unwrap();
        assert_eq!(record.record_type, RecordType::ExtendedLinearAddress);
        assert_eq!(record.data, vec![0x08, 0x00]);
    }

    #[test]
    fn unknown_type_code_is_carried_through() {
        let record = parse_record(b":00000007F9").unwrap();
        assert_eq!(record.record_type, RecordType::Other(0x07));
        assert_eq!(record.record_type.code(), 0x07);
    }

    #[test]
    fn parse_missing_start_code() {
        let err = parse_record(b"00000001FF").unwrap_err();
        assert!(matches!(err, RecordError::MissingStartCode));
    }

    #[test]
    fn parse_odd_digit_count() {
        let err = parse_record(b":00000001F").unwrap_err();
        assert!(matches!(err, RecordError::OddDigitCount { digits: 9 }));
    }

    #[test]
    fn parse_truncated_data() {
        // Declares 4 data bytes but carries only 2.
        let err = parse_record(b":040000000102??").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("truncated record"));
    }

    #[test]
    fn parse_truncated_checksum() {
        let err = parse_record(b":00000001").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("truncated record"));
        assert!(msg.contains("checksum"));
    }

    #[test]
    fn parse_invalid_hex_digit_names_field() {
        let err = parse_record(b":0000zz01FF").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid hex digit"));
        assert!(msg.contains("address"));
    }

    #[test]
    fn parse_trailing_characters() {
        let err = parse_record(b":00000001FF00").unwrap_err();
        assert!(matches!(err, RecordError::TrailingCharacters { extra: 2 }));
    }

    #[test]
    fn parse_checksum_mismatch_carries_both_values() {
        let err = parse_record(b":00000001FE").unwrap_err();
        assert!(matches!(
            err,
            RecordError::ChecksumMismatch {
                expected: 0xFF,
                actual: 0xFE,
            }
        ));
        assert!(err.to_string().contains("Mismatched checksum"));
    }

    #[test]
    fn checksum_round_trip() {
        let record = parse_record(b":0B0010006164647265737320676170A7").unwrap();
        assert_eq!(record.compute_checksum(), record.checksum);
    }

    #[test]
    fn checksum_of_eof_fields() {
        assert_eq!(checksum_of(0, 0, 1, &[]), 0xFF);
    }

    #[test]
    fn checksum_of_wraps_modulo_256() {
        let record = Record {
            byte_count: 1,
            address: 0xFFFF,
            record_type: RecordType::Data,
            data: vec![0xFF],
            checksum: 0,
        };
        // 0x01 + 0xFF + 0xFF + 0x00 + 0xFF = 0x2FE; low byte 0xFE negates to 0x02.
        assert_eq!(record.compute_checksum(), 0x02);
    }
}
