use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{LineSource, SourceError};

/// Line source over an arbitrary buffered reader (stdin, cursors in tests).
pub struct ReadLineSource<R> {
    reader: R,
}

impl<R: BufRead> ReadLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReadLineSource<R> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        // Byte-oriented on purpose: a NUL inside a line must survive intact
        // for the sanitizer to see.
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;
        if read == 0 { Ok(None) } else { Ok(Some(line)) }
    }
}

/// Line source backed by a file on disk.
pub struct FileLineSource {
    inner: ReadLineSource<BufReader<File>>,
}

impl FileLineSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: ReadLineSource::new(BufReader::new(file)),
        })
    }
}

impl LineSource for FileLineSource {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        self.inner.next_line()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::ReadLineSource;
    use crate::source::LineSource;

    #[test]
    fn yields_lines_with_terminators() {
        let mut source = ReadLineSource::new(Cursor::new(b"one\ntwo\n".to_vec()));
        assert_eq!(source.next_line().unwrap().unwrap(), b"one\n");
        assert_eq!(source.next_line().unwrap().unwrap(), b"two\n");
        assert!(source.next_line().unwrap().is_none());
    }

    #[test]
    fn final_line_without_terminator_is_yielded() {
        let mut source = ReadLineSource::new(Cursor::new(b"one".to_vec()));
        assert_eq!(source.next_line().unwrap().unwrap(), b"one");
        assert!(source.next_line().unwrap().is_none());
    }

    #[test]
    fn nul_bytes_survive_reading() {
        let mut source = ReadLineSource::new(Cursor::new(b":00\x0001FF\n".to_vec()));
        assert_eq!(source.next_line().unwrap().unwrap(), b":00\x0001FF\n");
    }
}
