//! Declarative Markdown grammar.
//!
//! Rules are plain data built once at start-up. Every rule carries a
//! [`Trigger`] telling the compiler how to find it: literal prefixes go into
//! a trie, everything else into an ordered predicate list keyed by the
//! bytes it can start with.

pub(crate) mod compiler;
pub(crate) mod matcher;

use crate::render::Tag;
use regex::Regex;

/// Block and inline token kinds. Declaration order is precedence order
/// within each scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum TokenKind {
    Heading,
    Fence,
    HorizontalRule,
    BlockQuote,
    UnorderedList,
    OrderedList,
    Table,
    Paragraph,

    Escape,
    Strong,
    Emphasis,
    Strike,
    Code,
    Image,
    Link,
    AutoLink,
    LineBreak,
}

/// A terminal or search pattern.
#[derive(Debug)]
pub(crate) enum Pattern {
    Literal(&'static str),
    /// Anchored with `^` when used as a terminal.
    Regex(Regex),
    /// The exact text of an earlier capture. As a search target it only
    /// matches a run of that byte with the same length.
    Backref(&'static str),
    /// Closing run of the inline delimiter held in the named capture.
    Closer(&'static str),
    /// `\n`, `\r\n`, or end of input.
    LineEnd,
}

#[derive(Debug)]
pub(crate) enum Rule {
    Terminal {
        pattern: Pattern,
        capture: Option<&'static str>,
        optional: bool,
        emit: Option<Tag>,
    },
    Sequence {
        rules: Vec<Rule>,
        emit: Option<Tag>,
    },
    Choice(Vec<Rule>),
    Repetition {
        rule: Box<Rule>,
        min: usize,
        max: usize,
        capture: Option<&'static str>,
    },
    Until {
        pattern: Pattern,
        capture: Option<&'static str>,
        recurse_inline: bool,
    },
    Structural(Structural),
}

/// Rules that need more than pattern matching.
#[derive(Debug)]
pub(crate) enum Structural {
    /// Contiguous list marker lines plus their continuation lines.
    ListItems { capture: &'static str },
    /// One line containing a pipe.
    TableRow,
    /// At least `min` consecutive table rows.
    TableRows { capture: &'static str, min: usize },
    /// Lines up to a blank line or a block-starting line.
    ParagraphLines { capture: &'static str },
    /// Interior of an already-opened bracket pair, nesting aware.
    BalancedBrackets { open: u8, close: u8, capture: &'static str },
    /// Lines up to one that repeats the `fence` capture; runs to the end of
    /// input when no such line exists.
    Backreference { fence: &'static str, body: &'static str },
}

/// How the compiler indexes a rule.
#[derive(Debug)]
pub(crate) enum Trigger {
    /// Literal prefixes with per-prefix metadata, inserted into the trie.
    Literals(&'static [(&'static str, u8)]),
    /// Anchored predicate tried after the trie. `keys` are the bytes the
    /// predicate can start with; `None` means any byte.
    Pattern {
        predicate: &'static str,
        keys: Option<&'static [u8]>,
    },
    /// Never dispatched; used when nothing else matches.
    Fallback,
}

#[derive(Debug)]
pub(crate) struct RuleDef {
    pub kind: TokenKind,
    pub trigger: Trigger,
    pub rule: Rule,
}

#[derive(Debug)]
pub(crate) struct Grammar {
    pub block: Vec<RuleDef>,
    pub inline: Vec<RuleDef>,
}

impl Rule {
    fn term(pattern: Pattern) -> Rule {
        Rule::Terminal {
            pattern,
            capture: None,
            optional: false,
            emit: None,
        }
    }

    fn capture(pattern: Pattern, name: &'static str) -> Rule {
        Rule::Terminal {
            pattern,
            capture: Some(name),
            optional: false,
            emit: None,
        }
    }

    fn optional(pattern: Pattern) -> Rule {
        Rule::Terminal {
            pattern,
            capture: None,
            optional: true,
            emit: None,
        }
    }

    fn until(pattern: Pattern, name: &'static str, recurse_inline: bool) -> Rule {
        Rule::Until {
            pattern,
            capture: Some(name),
            recurse_inline,
        }
    }

    fn repeat(rule: Rule, min: usize, max: usize, capture: Option<&'static str>) -> Rule {
        Rule::Repetition {
            rule: Box::new(rule),
            min,
            max,
            capture,
        }
    }

    fn seq(rules: Vec<Rule>, emit: Option<Tag>) -> Rule {
        Rule::Sequence { rules, emit }
    }

    /// The emission tag declared on the outermost rule.
    pub(crate) fn emit(&self) -> Option<Tag> {
        match self {
            Rule::Terminal { emit, .. } | Rule::Sequence { emit, .. } => *emit,
            _ => None,
        }
    }

    /// Whether the named capture is itself inline content to tokenize.
    pub(crate) fn recurses_into(&self, name: &str) -> bool {
        match self {
            Rule::Until {
                capture: Some(c),
                recurse_inline,
                ..
            } => *c == name && *recurse_inline,
            Rule::Sequence { rules, .. } | Rule::Choice(rules) => {
                rules.iter().any(|r| r.recurses_into(name))
            }
            Rule::Repetition { rule, .. } => rule.recurses_into(name),
            _ => false,
        }
    }
}

// The patterns below are fixed strings checked by the unit tests.
fn re(pattern: &str) -> Pattern {
    Pattern::Regex(Regex::new(pattern).expect("static grammar pattern"))
}

pub(crate) const UNORDERED_MARKER: &str = r"^[ \t]*[*+-][ \t]+\S";
pub(crate) const ORDERED_MARKER: &str = r"^[ \t]*\d+\.[ \t]+\S";
const TABLE_LINE: &str = r"^[^\n]*\|";
const AUTOLINK: &str = r#"^https?://[^\s<>\[\]()"']+"#;
const ESCAPABLE: &str = r"^[\\`*_{}\[\]()#+\-.!|~>]";

/// Build the Markdown grammar. Called once by the compiler.
pub(crate) fn markdown() -> Grammar {
    let block = vec![
        RuleDef {
            kind: TokenKind::Heading,
            trigger: Trigger::Literals(&[
                ("# ", 1),
                ("## ", 2),
                ("### ", 3),
                ("#### ", 4),
                ("##### ", 5),
                ("###### ", 6),
            ]),
            rule: Rule::seq(
                vec![
                    Rule::repeat(Rule::term(Pattern::Literal("#")), 1, 6, Some("marker")),
                    Rule::repeat(Rule::term(re(r"^[ \t]")), 1, usize::MAX, None),
                    Rule::until(Pattern::LineEnd, "content", true),
                    Rule::term(Pattern::LineEnd),
                ],
                None,
            ),
        },
        RuleDef {
            kind: TokenKind::Fence,
            trigger: Trigger::Literals(&[("```", b'`'), ("~~~", b'~')]),
            rule: Rule::seq(
                vec![
                    Rule::Choice(vec![
                        Rule::capture(re(r"^`{3,}"), "fence"),
                        Rule::capture(re(r"^~{3,}"), "fence"),
                    ]),
                    Rule::until(Pattern::LineEnd, "info", false),
                    Rule::term(Pattern::LineEnd),
                    Rule::Structural(Structural::Backreference {
                        fence: "fence",
                        body: "body",
                    }),
                ],
                Some(Tag::Pre),
            ),
        },
        RuleDef {
            kind: TokenKind::HorizontalRule,
            trigger: Trigger::Literals(&[("---", 0)]),
            rule: Rule::seq(
                vec![
                    Rule::repeat(
                        Rule::term(Pattern::Literal("-")),
                        3,
                        usize::MAX,
                        Some("marker"),
                    ),
                    Rule::repeat(Rule::term(re(r"^[ \t]")), 0, usize::MAX, None),
                    Rule::term(Pattern::LineEnd),
                ],
                Some(Tag::Hr),
            ),
        },
        RuleDef {
            kind: TokenKind::BlockQuote,
            trigger: Trigger::Literals(&[(">", 0)]),
            rule: Rule::seq(
                vec![
                    Rule::capture(Pattern::Literal(">"), "marker"),
                    Rule::optional(Pattern::Literal(" ")),
                    Rule::until(Pattern::LineEnd, "content", true),
                    Rule::term(Pattern::LineEnd),
                ],
                Some(Tag::Blockquote),
            ),
        },
        RuleDef {
            kind: TokenKind::UnorderedList,
            trigger: Trigger::Pattern {
                predicate: UNORDERED_MARKER,
                keys: Some(b" \t*+-"),
            },
            rule: Rule::Structural(Structural::ListItems { capture: "items" }),
        },
        RuleDef {
            kind: TokenKind::OrderedList,
            trigger: Trigger::Pattern {
                predicate: ORDERED_MARKER,
                keys: Some(b" \t0123456789"),
            },
            rule: Rule::Structural(Structural::ListItems { capture: "items" }),
        },
        RuleDef {
            kind: TokenKind::Table,
            trigger: Trigger::Pattern {
                predicate: TABLE_LINE,
                keys: None,
            },
            rule: Rule::Structural(Structural::TableRows {
                capture: "rows",
                min: 2,
            }),
        },
        RuleDef {
            kind: TokenKind::Paragraph,
            trigger: Trigger::Fallback,
            rule: Rule::Structural(Structural::ParagraphLines { capture: "lines" }),
        },
    ];

    let inline = vec![
        RuleDef {
            kind: TokenKind::Escape,
            trigger: Trigger::Literals(&[("\\", 0)]),
            rule: Rule::seq(
                vec![
                    Rule::term(Pattern::Literal("\\")),
                    Rule::capture(re(ESCAPABLE), "char"),
                ],
                None,
            ),
        },
        delimited(TokenKind::Strong, &[("**", b'*'), ("__", b'_')], r"^(?:\*\*|__)", Tag::Strong),
        delimited(TokenKind::Emphasis, &[("*", b'*'), ("_", b'_')], r"^[*_]", Tag::Em),
        delimited(TokenKind::Strike, &[("~~", b'~')], r"^~~", Tag::Del),
        RuleDef {
            kind: TokenKind::Code,
            trigger: Trigger::Literals(&[("`", b'`')]),
            rule: Rule::seq(
                vec![
                    Rule::capture(re(r"^`+"), "marker"),
                    Rule::until(Pattern::Backref("marker"), "content", false),
                    Rule::term(Pattern::Backref("marker")),
                ],
                Some(Tag::Code),
            ),
        },
        RuleDef {
            kind: TokenKind::Image,
            trigger: Trigger::Literals(&[("![", 0)]),
            rule: bracketed("![", Tag::Img),
        },
        RuleDef {
            kind: TokenKind::Link,
            trigger: Trigger::Literals(&[("[", 0)]),
            rule: bracketed("[", Tag::A),
        },
        RuleDef {
            kind: TokenKind::AutoLink,
            trigger: Trigger::Pattern {
                predicate: AUTOLINK,
                keys: Some(b"h"),
            },
            rule: Rule::Terminal {
                pattern: re(AUTOLINK),
                capture: Some("url"),
                optional: false,
                emit: Some(Tag::A),
            },
        },
        RuleDef {
            kind: TokenKind::LineBreak,
            trigger: Trigger::Literals(&[("\n", 0), ("\r\n", 0)]),
            rule: Rule::Terminal {
                pattern: Pattern::LineEnd,
                capture: None,
                optional: false,
                emit: Some(Tag::Br),
            },
        },
    ];

    Grammar { block, inline }
}

/// `marker content marker`, where the content is inline markup itself.
fn delimited(
    kind: TokenKind,
    literals: &'static [(&'static str, u8)],
    opener: &str,
    tag: Tag,
) -> RuleDef {
    RuleDef {
        kind,
        trigger: Trigger::Literals(literals),
        rule: Rule::seq(
            vec![
                Rule::capture(re(opener), "marker"),
                Rule::until(Pattern::Closer("marker"), "content", true),
                Rule::term(Pattern::Closer("marker")),
            ],
            Some(tag),
        ),
    }
}

/// `open text ] ( target )` with bracket-depth counting on both parts.
fn bracketed(open: &'static str, tag: Tag) -> Rule {
    Rule::seq(
        vec![
            Rule::term(Pattern::Literal(open)),
            Rule::Structural(Structural::BalancedBrackets {
                open: b'[',
                close: b']',
                capture: "text",
            }),
            Rule::term(Pattern::Literal("(")),
            Rule::Structural(Structural::BalancedBrackets {
                open: b'(',
                close: b')',
                capture: "target",
            }),
        ],
        Some(tag),
    )
}
