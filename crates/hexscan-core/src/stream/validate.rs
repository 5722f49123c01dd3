use crate::record::{Record, RecordType, parse_record};

use super::error::{DATA_AFTER_EOF, EOF_MISSING, IssueKind, LineIssue};
use super::sanitize::{is_blank, sanitize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Terminated,
}

/// Incremental stream validator.
///
/// Feed raw lines in input order, then call [`Validator::finish`] once the
/// input runs out. The first issue is terminal for the decode attempt; a
/// caller that wants to retry starts over with a fresh validator.
#[derive(Debug)]
pub struct Validator {
    records: Vec<Record>,
    state: State,
    line: usize,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: State::Scanning,
            line: 0,
        }
    }

    /// Sanitize and decode one raw line, terminator included or not.
    pub fn feed(&mut self, raw: &[u8]) -> Result<(), LineIssue> {
        self.line += 1;
        let clean = sanitize(raw, self.line)?;
        if is_blank(clean) {
            return Ok(());
        }
        match self.state {
            State::Terminated => Err(LineIssue {
                line: self.line,
                kind: IssueKind::UnexpectedEndOfFile {
                    detail: DATA_AFTER_EOF,
                },
            }),
            State::Scanning => {
                let record = parse_record(clean).map_err(|err| LineIssue {
                    line: self.line,
                    kind: IssueKind::from(err),
                })?;
                if record.record_type == RecordType::EndOfFile {
                    self.state = State::Terminated;
                }
                self.records.push(record);
                Ok(())
            }
        }
    }

    /// Close the stream: the decoded records if the EOF record was seen,
    /// otherwise the missing-EOF diagnostic positioned just past the last
    /// consumed line.
    pub fn finish(self) -> Result<Vec<Record>, LineIssue> {
        match self.state {
            State::Terminated => Ok(self.records),
            State::Scanning => Err(LineIssue {
                line: self.line + 1,
                kind: IssueKind::UnexpectedEndOfFile {
                    detail: EOF_MISSING,
                },
            }),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
