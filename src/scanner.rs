//! Cursor over the input with the three scanning primitives every rule is
//! built from. Nothing here fails loudly: a miss returns `None` and leaves
//! the position where it was.

use crate::grammar::Pattern;
use crate::grammar::matcher::Captures;
use regex::Regex;

/// Characters whose backslash escape is kept in captured spans while
/// searching for closing delimiters or brackets, so the recursive inline
/// pass sees them still escaped.
pub(crate) const DELIMITER_ESCAPES: &[u8] = b"[]*_";

#[derive(Clone, Copy, Debug)]
pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    #[inline]
    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn save(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// The byte just before the cursor.
    #[inline]
    pub(crate) fn prev(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.input.as_bytes().get(i).copied())
    }

    /// Unconditionally consume `n` bytes, clamped to the input and widened to
    /// the next char boundary.
    pub(crate) fn advance(&mut self, n: usize) -> &'a str {
        let start = self.pos;
        let mut end = (self.pos + n).min(self.input.len());
        while !self.input.is_char_boundary(end) {
            end += 1;
        }
        self.pos = end;
        &self.input[start..end]
    }

    pub(crate) fn match_literal(&mut self, literal: &str) -> Option<&'a str> {
        if self.rest().starts_with(literal) {
            Some(self.advance(literal.len()))
        } else {
            None
        }
    }

    /// `re` must be anchored with `^`; it is run against the remaining input.
    pub(crate) fn match_regex(&mut self, re: &Regex) -> Option<&'a str> {
        let m = re.find(self.rest())?;
        if m.start() != 0 || m.is_empty() {
            return None;
        }
        Some(self.advance(m.end()))
    }

    pub(crate) fn match_pattern(&mut self, pattern: &Pattern, caps: &Captures<'a>) -> Option<&'a str> {
        match pattern {
            Pattern::Literal(lit) => self.match_literal(lit),
            Pattern::Regex(re) => self.match_regex(re),
            Pattern::Backref(name) | Pattern::Closer(name) => {
                let text = caps.get(name)?;
                self.match_literal(text)
            }
            Pattern::LineEnd => {
                if self.is_eof() {
                    Some("")
                } else if self.rest().starts_with("\r\n") {
                    Some(self.advance(2))
                } else if self.peek() == Some(b'\n') {
                    Some(self.advance(1))
                } else {
                    None
                }
            }
        }
    }

    /// Advance to (not past) the first occurrence of `pattern`, returning the
    /// skipped span. On a miss the cursor does not move.
    pub(crate) fn scan_until(&mut self, pattern: &Pattern, caps: &Captures<'a>) -> Option<&'a str> {
        let start = self.pos;
        let rest = self.rest().as_bytes();
        let offset = match pattern {
            Pattern::Literal(lit) => memchr::memmem::find(rest, lit.as_bytes())?,
            Pattern::Regex(re) => re.find(self.rest())?.start(),
            Pattern::Backref(name) => {
                let text = caps.get(name)?;
                find_exact_run(rest, text.as_bytes())?
            }
            Pattern::Closer(name) => {
                let marker = caps.get(name)?;
                self.find_closer(marker)? - start
            }
            Pattern::LineEnd => self.line_end() - start,
        };
        self.pos = start + offset;
        Some(&self.input[start..self.pos])
    }

    /// Byte offset of the end of the current line, excluding `\r\n` / `\n`.
    pub(crate) fn line_end(&self) -> usize {
        let bytes = self.input.as_bytes();
        let end = memchr::memchr(b'\n', &bytes[self.pos..])
            .map(|i| self.pos + i)
            .unwrap_or(bytes.len());
        if end > self.pos && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }

    /// The current line without its terminator; does not move the cursor.
    pub(crate) fn current_line(&self) -> &'a str {
        &self.input[self.pos..self.line_end()]
    }

    /// Consume the current line including its terminator.
    pub(crate) fn skip_line(&mut self) -> &'a str {
        let line = self.current_line();
        let bytes = self.input.as_bytes();
        let mut end = self.pos + line.len();
        if bytes.get(end) == Some(&b'\r') {
            end += 1;
        }
        if bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        self.pos = end;
        line
    }

    /// Scan to the bracket closing an already-consumed `open`, counting
    /// nesting depth. Returns the interior and consumes the closer.
    pub(crate) fn scan_balanced(&mut self, open: u8, close: u8) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut depth = 1usize;
        let mut i = start;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\\' && bytes.get(i + 1).is_some_and(|n| DELIMITER_ESCAPES.contains(n)) {
                i += 2;
                continue;
            }
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    self.pos = i + 1;
                    return Some(&self.input[start..i]);
                }
            }
            i += 1;
        }
        None
    }

    /// Find the closing run for an inline delimiter opened just before the
    /// cursor. Escaped delimiters and code spans are skipped; a single-char
    /// marker only closes on a run of exactly one, a longer marker closes on
    /// the tail of a run at least as long.
    fn find_closer(&self, marker: &str) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let m = marker.as_bytes();
        let (ch, n) = (*m.first()?, m.len());
        let start = self.pos;
        let mut i = start;

        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\\' && bytes.get(i + 1).is_some_and(|n| DELIMITER_ESCAPES.contains(n)) {
                i += 2;
                continue;
            }
            if b == b'`' && ch != b'`' {
                i = skip_code_span(bytes, i);
                continue;
            }
            if b != ch {
                i += 1;
                continue;
            }

            let run_start = i;
            while i < bytes.len() && bytes[i] == ch {
                i += 1;
            }
            let run = i - run_start;
            let at = if n == 1 {
                (run == 1).then_some(run_start)
            } else {
                (run >= n).then_some(i - n)
            };
            if let Some(at) = at
                && at > start
                && can_close(bytes, at, n, ch)
            {
                return Some(at);
            }
        }
        None
    }
}

fn can_close(bytes: &[u8], at: usize, len: usize, ch: u8) -> bool {
    if bytes[at - 1].is_ascii_whitespace() {
        return false;
    }
    if ch == b'_' && bytes.get(at + len).is_some_and(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    true
}

/// Position after a code span starting at `i`, or after the lone backtick
/// run when it never closes.
fn skip_code_span(bytes: &[u8], i: usize) -> usize {
    let mut end = i;
    while end < bytes.len() && bytes[end] == b'`' {
        end += 1;
    }
    let ticks = &bytes[i..end];
    match find_exact_run(&bytes[end..], ticks) {
        Some(off) => end + off + ticks.len(),
        None => end,
    }
}

/// Offset of the first run of `run`'s byte that is exactly as long as `run`.
/// Longer runs are skipped whole.
fn find_exact_run(hay: &[u8], run: &[u8]) -> Option<usize> {
    let ch = *run.first()?;
    let mut from = 0;
    while let Some(off) = memchr::memmem::find(&hay[from..], run) {
        let at = from + off;
        let mut end = at;
        while end < hay.len() && hay[end] == ch {
            end += 1;
        }
        if end - at == run.len() {
            return Some(at);
        }
        from = end;
    }
    None
}
