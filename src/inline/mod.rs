//! Recursive inline tokenizer.
//!
//! Text runs are skipped byte by byte until a byte that can open an inline
//! rule. There the compiled inline scope supplies candidates, longest literal
//! first; each is guarded by adjacent-character checks and then matched
//! against its grammar rule. A delimiter that opens nothing is kept as
//! literal text and scanning resumes right after it.

mod links;
mod render;

use crate::grammar::compiler::{Candidate, CompiledScope, GRAMMAR};
use crate::grammar::matcher::{Captures, match_rule};
use crate::grammar::{Rule, TokenKind};
use crate::render::{Renderer, Tag};
use crate::scanner::Scanner;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Inline<'a> {
    Text(&'a str),
    /// Strong, emphasis or strikethrough around nested content.
    Span {
        tag: Tag,
        marker: &'a str,
        children: Vec<Inline<'a>>,
    },
    Code {
        marker: &'a str,
        content: &'a str,
    },
    Link {
        children: Vec<Inline<'a>>,
        href: &'a str,
        title: Option<&'a str>,
    },
    Image {
        alt: &'a str,
        src: &'a str,
        title: Option<&'a str>,
    },
    AutoLink(&'a str),
    Break {
        hard: bool,
    },
}

/// Tokenize `text` and append its HTML to `out`.
pub(crate) fn render_inline(out: &mut String, text: &str, r: &Renderer<'_>) {
    let tokens = tokenize(text);
    render::render_inlines(out, &tokens, r);
}

pub(crate) fn tokenize(text: &str) -> Vec<Inline<'_>> {
    Tokenizer::new(text, false).run()
}

struct Tokenizer<'a> {
    sc: Scanner<'a>,
    scope: &'static CompiledScope,
    tokens: Vec<Inline<'a>>,
    text_start: usize,
    /// Inside link text, where anchors cannot nest.
    in_link: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str, in_link: bool) -> Self {
        Self {
            sc: Scanner::new(text),
            scope: &GRAMMAR.inline,
            tokens: Vec::new(),
            text_start: 0,
            in_link,
        }
    }

    fn run(mut self) -> Vec<Inline<'a>> {
        while let Some(b) = self.sc.peek() {
            if !self.scope.is_special(b) {
                self.sc.advance(1);
                continue;
            }
            let pos = self.sc.pos();
            let candidates = self.scope.candidates(self.sc.input(), pos);
            match self.first_match(&candidates) {
                Some(token) => self.push(pos, token),
                None => {
                    let len = candidates.first().map_or(1, |c| c.len.max(1));
                    if !candidates.is_empty() {
                        log::trace!("unmatched inline opener at offset {pos}, keeping as text");
                    }
                    self.sc.advance(len);
                }
            }
        }
        let tail = &self.sc.input()[self.text_start..];
        if !tail.is_empty() {
            self.tokens.push(Inline::Text(tail));
        }
        self.tokens
    }

    /// Flush the pending text run ending at `pos`, then push `token`.
    fn push(&mut self, pos: usize, mut token: Inline<'a>) {
        let mut run = &self.sc.input()[self.text_start..pos];
        if let Inline::Break { hard } = &mut token {
            let trimmed = run.trim_end_matches(' ');
            if run.len() - trimmed.len() >= 2 {
                *hard = true;
                run = trimmed;
            }
        }
        if !run.is_empty() {
            self.tokens.push(Inline::Text(run));
        }
        self.tokens.push(token);
        self.text_start = self.sc.pos();
    }

    fn first_match(&mut self, candidates: &[Candidate]) -> Option<Inline<'a>> {
        let scope = self.scope;
        for &candidate in candidates {
            if !self.can_open(candidate) {
                continue;
            }
            let Some(rule) = scope.rule(candidate.kind) else {
                continue;
            };
            let start = self.sc.save();
            let mut caps = Captures::default();
            if !match_rule(rule, &mut self.sc, &mut caps) {
                continue;
            }
            if let Some(token) = self.token(candidate.kind, rule, &caps, start) {
                return Some(token);
            }
            self.sc.restore(start);
        }
        None
    }

    /// Adjacent-character checks that decide whether a delimiter may open.
    fn can_open(&self, candidate: Candidate) -> bool {
        let bytes = self.sc.input().as_bytes();
        let pos = self.sc.pos();
        let prev = self.sc.prev();
        let prev_alnum = prev.is_some_and(|b| b.is_ascii_alphanumeric());

        match candidate.kind {
            TokenKind::Strong | TokenKind::Emphasis | TokenKind::Strike => {
                let ch = bytes[pos];
                let next = bytes.get(pos + candidate.len).copied();
                if next.is_none_or(|b| b.is_ascii_whitespace()) {
                    return false;
                }
                // A lone marker touching another of its kind is part of a
                // longer run that already failed to match.
                if candidate.kind == TokenKind::Emphasis && (next == Some(ch) || prev == Some(ch)) {
                    return false;
                }
                !(ch == b'_' && prev_alnum)
            }
            TokenKind::Link => !self.in_link,
            TokenKind::AutoLink => !self.in_link && !prev_alnum,
            _ => true,
        }
    }

    fn token(
        &mut self,
        kind: TokenKind,
        rule: &Rule,
        caps: &Captures<'a>,
        start: usize,
    ) -> Option<Inline<'a>> {
        let token = match kind {
            TokenKind::Escape => Inline::Text(caps.text("char")),
            TokenKind::Strong | TokenKind::Emphasis | TokenKind::Strike => {
                let content = caps.text("content");
                let children = if rule.recurses_into("content") {
                    Tokenizer::new(content, self.in_link).run()
                } else {
                    vec![Inline::Text(content)]
                };
                Inline::Span {
                    tag: rule.emit()?,
                    marker: caps.text("marker"),
                    children,
                }
            }
            TokenKind::Code => Inline::Code {
                marker: caps.text("marker"),
                content: links::trim_code(caps.text("content")),
            },
            TokenKind::Image => {
                let (src, title) = links::split_target(caps.text("target"));
                Inline::Image {
                    alt: caps.text("text"),
                    src,
                    title,
                }
            }
            TokenKind::Link => {
                let (href, title) = links::split_target(caps.text("target"));
                Inline::Link {
                    children: Tokenizer::new(caps.text("text"), true).run(),
                    href,
                    title,
                }
            }
            TokenKind::AutoLink => {
                let url = links::trim_autolink(caps.text("url"))?;
                self.sc.restore(start + url.len());
                Inline::AutoLink(url)
            }
            TokenKind::LineBreak => Inline::Break { hard: false },
            _ => return None,
        };
        Some(token)
    }
}
