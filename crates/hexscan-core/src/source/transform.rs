use std::collections::VecDeque;

use super::{LineSource, SourceError};

/// Per-line rewriting step between a source and the decoder.
///
/// A transform may expand one input line into several output lines or drop
/// it entirely; output order is preserved.
pub trait LineTransform {
    fn transform(&mut self, line: &[u8]) -> Result<Vec<Vec<u8>>, SourceError>;
}

impl<F> LineTransform for F
where
    F: FnMut(&[u8]) -> Result<Vec<Vec<u8>>, SourceError>,
{
    fn transform(&mut self, line: &[u8]) -> Result<Vec<Vec<u8>>, SourceError> {
        self(line)
    }
}

/// `LineSource` adapter that routes every line of `inner` through a
/// [`LineTransform`].
pub struct TransformSource<S, T> {
    inner: S,
    transform: T,
    pending: VecDeque<Vec<u8>>,
}

impl<S: LineSource, T: LineTransform> TransformSource<S, T> {
    pub fn new(inner: S, transform: T) -> Self {
        Self {
            inner,
            transform,
            pending: VecDeque::new(),
        }
    }
}

impl<S: LineSource, T: LineTransform> LineSource for TransformSource<S, T> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }
            match self.inner.next_line()? {
                Some(raw) => self.pending.extend(self.transform.transform(&raw)?),
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::TransformSource;
    use crate::source::{LineSource, ReadLineSource, SourceError};

    fn collect<S: LineSource>(mut source: S) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn identity_transform_passes_lines_through() {
        let inner = ReadLineSource::new(Cursor::new(b"a\nb\n".to_vec()));
        let source = TransformSource::new(inner, |line: &[u8]| Ok(vec![line.to_vec()]));
        assert_eq!(collect(source), vec![b"a\n".to_vec(), b"b\n".to_vec()]);
    }

    #[test]
    fn transform_may_expand_a_line() {
        let inner = ReadLineSource::new(Cursor::new(b"ab\n".to_vec()));
        let source = TransformSource::new(inner, |line: &[u8]| {
            Ok(line
                .iter()
                .filter(|byte| !byte.is_ascii_whitespace())
                .map(|&byte| vec![byte, b'\n'])
                .collect())
        });
        assert_eq!(collect(source), vec![b"a\n".to_vec(), b"b\n".to_vec()]);
    }

    #[test]
    fn transform_may_drop_a_line() {
        let inner = ReadLineSource::new(Cursor::new(b"drop\nkeep\n".to_vec()));
        let source = TransformSource::new(inner, |line: &[u8]| {
            if line.starts_with(b"drop") {
                Ok(Vec::new())
            } else {
                Ok(vec![line.to_vec()])
            }
        });
        assert_eq!(collect(source), vec![b"keep\n".to_vec()]);
    }

    #[test]
    fn transform_errors_surface() {
        let inner = ReadLineSource::new(Cursor::new(b"a\n".to_vec()));
        let mut source = TransformSource::new(inner, |_: &[u8]| {
            Err(SourceError::Transform("refused".to_string()))
        });
        assert!(source.next_line().is_err());
    }
}
