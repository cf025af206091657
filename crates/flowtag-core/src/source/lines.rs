use std::io::BufRead;

use super::{LineSource, SourceError};

/// `LineSource` over any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// corrupt line is classified as malformed instead of failing the run.
///
/// # Examples
/// ```
/// use flowtag_core::{BufReadSource, LineSource};
///
/// let mut source = BufReadSource::new("first\nsecond\n".as_bytes());
/// assert_eq!(source.next_line().unwrap(), Some("first"));
/// assert_eq!(source.next_line().unwrap(), Some("second"));
/// assert_eq!(source.next_line().unwrap(), None);
/// ```
pub struct BufReadSource<R> {
    reader: R,
    raw: Vec<u8>,
    line: String,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            raw: Vec::new(),
            line: String::new(),
        }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn next_line(&mut self) -> Result<Option<&str>, SourceError> {
        self.raw.clear();
        if self.reader.read_until(b'\n', &mut self.raw)? == 0 {
            return Ok(None);
        }
        self.line.clear();
        self.line.push_str(&String::from_utf8_lossy(&self.raw));
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }
}

#[cfg(test)]
mod tests {
    use super::BufReadSource;
    use crate::source::LineSource;

    #[test]
    fn strips_line_terminators() {
        let mut source = BufReadSource::new("a b\r\nc d\n\nlast".as_bytes());
        assert_eq!(source.next_line().unwrap(), Some("a b"));
        assert_eq!(source.next_line().unwrap(), Some("c d"));
        assert_eq!(source.next_line().unwrap(), Some(""));
        assert_eq!(source.next_line().unwrap(), Some("last"));
        assert_eq!(source.next_line().unwrap(), None);
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut source = BufReadSource::new(&b""[..]);
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut source = BufReadSource::new(&b"ok\n\xff\xfe 25\n"[..]);
        assert_eq!(source.next_line().unwrap(), Some("ok"));
        let line = source.next_line().unwrap().unwrap();
        assert!(line.ends_with(" 25"));
        assert!(line.contains('\u{FFFD}'));
    }
}
