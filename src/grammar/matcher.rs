use super::{Rule, Structural};
use crate::block::leaf_blocks::{
    breaks_paragraph, is_blank, is_closing_fence, is_list_continuation, list_item,
};
use crate::scanner::Scanner;

/// Name → text bindings for one rule attempt. Values borrow the input.
#[derive(Debug, Default)]
pub(crate) struct Captures<'a> {
    entries: Vec<(&'static str, &'a str)>,
}

impl<'a> Captures<'a> {
    /// Latest binding for `name`.
    pub(crate) fn get(&self, name: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Like [`get`](Self::get) but empty when unbound.
    pub(crate) fn text(&self, name: &str) -> &'a str {
        self.get(name).unwrap_or("")
    }

    pub(crate) fn push(&mut self, name: &'static str, value: &'a str) {
        self.entries.push((name, value));
    }

    fn mark(&self) -> usize {
        self.entries.len()
    }

    fn truncate(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }
}

/// Try `rule` at the cursor. On success the cursor is past the match and the
/// rule's bindings are in `caps`; on failure both are exactly as before.
pub(crate) fn match_rule<'a>(rule: &Rule, sc: &mut Scanner<'a>, caps: &mut Captures<'a>) -> bool {
    let saved = sc.save();
    let mark = caps.mark();

    let matched = match rule {
        Rule::Terminal {
            pattern,
            capture,
            optional,
            ..
        } => match sc.match_pattern(pattern, caps) {
            Some(text) => {
                if let Some(name) = capture {
                    caps.push(name, text);
                }
                true
            }
            None => *optional,
        },
        Rule::Sequence { rules, .. } => rules.iter().all(|r| match_rule(r, sc, caps)),
        // A failed branch restores itself before the next one runs.
        Rule::Choice(rules) => rules.iter().any(|r| match_rule(r, sc, caps)),
        Rule::Repetition {
            rule,
            min,
            max,
            capture,
        } => {
            let start = sc.pos();
            let mut count = 0;
            while count < *max {
                let before = sc.pos();
                if !match_rule(rule, sc, caps) || sc.pos() == before {
                    break;
                }
                count += 1;
            }
            if count >= *min {
                if let Some(name) = capture {
                    caps.push(name, &sc.input()[start..sc.pos()]);
                }
                true
            } else {
                false
            }
        }
        Rule::Until {
            pattern, capture, ..
        } => match sc.scan_until(pattern, caps) {
            Some(text) => {
                if let Some(name) = capture {
                    caps.push(name, text);
                }
                true
            }
            None => false,
        },
        Rule::Structural(structural) => match_structural(structural, sc, caps),
    };

    if !matched {
        sc.restore(saved);
        caps.truncate(mark);
    }
    matched
}

fn match_structural<'a>(rule: &Structural, sc: &mut Scanner<'a>, caps: &mut Captures<'a>) -> bool {
    match rule {
        Structural::ListItems { capture } => {
            let start = sc.pos();
            if list_item(sc.current_line()).is_none() {
                return false;
            }
            let mut end = start;
            while !sc.is_eof() {
                let line = sc.current_line();
                if list_item(line).is_none() && !is_list_continuation(line) {
                    break;
                }
                sc.skip_line();
                end = start + trimmed_len(&sc.input()[start..sc.pos()]);
            }
            caps.push(capture, &sc.input()[start..end]);
            true
        }
        Structural::TableRow => {
            let line = sc.current_line();
            if is_blank(line) || !line.contains('|') {
                return false;
            }
            sc.skip_line();
            true
        }
        Structural::TableRows { capture, min } => {
            let start = sc.pos();
            let mut rows = 0;
            while match_structural(&Structural::TableRow, sc, caps) {
                rows += 1;
            }
            if rows < *min {
                return false;
            }
            let span = &sc.input()[start..sc.pos()];
            caps.push(capture, &span[..trimmed_len(span)]);
            true
        }
        Structural::ParagraphLines { capture } => match paragraph_lines(sc, false) {
            Some(text) => {
                caps.push(capture, text);
                true
            }
            None => false,
        },
        Structural::BalancedBrackets {
            open,
            close,
            capture,
        } => match sc.scan_balanced(*open, *close) {
            Some(text) => {
                caps.push(capture, text);
                true
            }
            None => false,
        },
        Structural::Backreference { fence, body } => {
            let Some(marker) = caps.get(fence) else {
                return false;
            };
            let start = sc.pos();
            let mut end = sc.input().len();
            while !sc.is_eof() {
                let line_start = sc.pos();
                let line = sc.skip_line();
                if is_closing_fence(line, marker) {
                    end = line_start;
                    break;
                }
            }
            let span = &sc.input()[start..end.max(start)];
            caps.push(body, &span[..trimmed_len(span)]);
            true
        }
    }
}

/// Consume a paragraph: the current non-blank line and every following line
/// that is neither blank nor a block start. `allow_pipes` keeps pipe-led
/// lines in the paragraph, for table recovery.
pub(crate) fn paragraph_lines<'a>(sc: &mut Scanner<'a>, allow_pipes: bool) -> Option<&'a str> {
    if sc.is_eof() || is_blank(sc.current_line()) {
        return None;
    }
    let start = sc.pos();
    sc.skip_line();
    while !sc.is_eof() {
        let line = sc.current_line();
        if is_blank(line) || breaks_paragraph(line, allow_pipes) {
            break;
        }
        sc.skip_line();
    }
    let span = &sc.input()[start..sc.pos()];
    Some(&span[..trimmed_len(span)])
}

/// Length of `span` without one trailing line terminator.
fn trimmed_len(span: &str) -> usize {
    let s = span.strip_suffix('\n').unwrap_or(span);
    s.strip_suffix('\r').unwrap_or(s).len()
}
