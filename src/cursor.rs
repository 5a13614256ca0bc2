use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;

use memchr::memchr;
use smallvec::SmallVec;

use crate::Result;

/// One input line without its terminator. Borrowed when the input is a
/// `&str`, owned when it came through a reader.
pub type Line<'de> = Cow<'de, str>;

enum Source<'de> {
    Str(&'de str),
    Reader(Box<dyn BufRead + 'de>),
}

/// Buffered line source with non-destructive peek and pushback.
///
/// Lines are split on `\n`; a `\r` directly before it is dropped. A final
/// terminator does not produce an extra empty line.
pub struct LineCursor<'de> {
    source: Source<'de>,
    // Last element is the next line handed out.
    pending: SmallVec<[Line<'de>; 2]>,
    consumed: usize,
}

impl<'de> LineCursor<'de> {
    pub fn from_str(input: &'de str) -> Self {
        Self::new(Source::Str(input))
    }

    pub fn from_reader<R: BufRead + 'de>(reader: R) -> Self {
        Self::new(Source::Reader(Box::new(reader)))
    }

    fn new(source: Source<'de>) -> Self {
        Self {
            source,
            pending: SmallVec::new(),
            consumed: 0,
        }
    }

    /// Next line without consuming it. Repeated calls return the same line.
    pub fn peek(&mut self) -> Result<Option<&str>> {
        if self.pending.is_empty() {
            if let Some(line) = self.pull()? {
                self.pending.push(line);
            }
        }
        Ok(self.pending.last().map(|line| line.as_ref()))
    }

    /// Consume and return the next line, draining pushed-back lines first.
    pub fn read(&mut self) -> Result<Option<Line<'de>>> {
        let line = match self.pending.pop() {
            Some(line) => Some(line),
            None => self.pull()?,
        };
        if line.is_some() {
            self.consumed += 1;
        }
        Ok(line)
    }

    /// Make `line` the next value returned by [`read`](Self::read) and
    /// [`peek`](Self::peek). It does not have to be the line last read.
    pub fn pushback(&mut self, line: Line<'de>) {
        self.consumed = self.consumed.saturating_sub(1);
        self.pending.push(line);
    }

    /// True when nothing is pending and the underlying source is exhausted.
    pub fn at_end(&mut self) -> Result<bool> {
        if !self.pending.is_empty() {
            return Ok(false);
        }
        match &mut self.source {
            Source::Str(rest) => Ok(rest.is_empty()),
            Source::Reader(reader) => Ok(reader.fill_buf()?.is_empty()),
        }
    }

    /// Number of lines consumed so far, net of pushbacks.
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// 1-based number of the line the next `read` returns.
    pub fn next_line_number(&self) -> usize {
        self.consumed + 1
    }

    fn pull(&mut self) -> Result<Option<Line<'de>>> {
        match &mut self.source {
            Source::Str(rest) => {
                let input: &'de str = *rest;
                if input.is_empty() {
                    return Ok(None);
                }
                let (line, tail) = match memchr(b'\n', input.as_bytes()) {
                    Some(idx) => (&input[..idx], &input[idx + 1..]),
                    None => (input, ""),
                };
                *rest = tail;
                Ok(Some(Cow::Borrowed(line.strip_suffix('\r').unwrap_or(line))))
            }
            Source::Reader(reader) => {
                let mut buf = String::new();
                if reader.read_line(&mut buf)? == 0 {
                    return Ok(None);
                }
                if buf.ends_with('\n') {
                    buf.pop();
                    if buf.ends_with('\r') {
                        buf.pop();
                    }
                }
                Ok(Some(Cow::Owned(buf)))
            }
        }
    }
}

impl fmt::Debug for LineCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineCursor")
            .field("pending", &self.pending)
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}
