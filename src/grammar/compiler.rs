//! Compiles the grammar into a byte trie over literal prefixes, a first-byte
//! dispatch table, and an ordered list of non-literal predicates.
//!
//! Compilation runs once per process and the result is shared read-only by
//! every parse call.

use super::{Grammar, Rule, RuleDef, TokenKind, Trigger};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) type NodeId = u32;

const ROOT: NodeId = 0;

/// Process-wide compiled grammar.
pub(crate) static GRAMMAR: Lazy<CompiledGrammar> = Lazy::new(|| {
    let compiled = CompiledGrammar::compile(super::markdown());
    log::debug!(
        "compiled grammar: {} block trie nodes, {} inline trie nodes",
        compiled.block.trie.nodes.len(),
        compiled.inline.trie.nodes.len()
    );
    compiled
});

/// What a trie node accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Accept {
    pub kind: TokenKind,
    /// Rule-specific metadata, e.g. the heading level.
    pub meta: u8,
}

#[derive(Debug, Default)]
struct TrieNode {
    /// Sorted by byte.
    edges: Vec<(u8, NodeId)>,
    terminal: Option<Accept>,
}

#[derive(Debug)]
pub(crate) struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    fn insert(&mut self, literal: &str, accept: Accept) {
        let mut node = ROOT;
        for &b in literal.as_bytes() {
            node = match self.child(node, b) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len() as NodeId;
                    self.nodes.push(TrieNode::default());
                    let edges = &mut self.nodes[node as usize].edges;
                    let at = edges.partition_point(|&(e, _)| e < b);
                    edges.insert(at, (b, next));
                    next
                }
            };
        }
        // First insertion wins, so precedence follows grammar order.
        let terminal = &mut self.nodes[node as usize].terminal;
        if terminal.is_none() {
            *terminal = Some(accept);
        }
    }

    #[inline]
    fn child(&self, node: NodeId, b: u8) -> Option<NodeId> {
        let edges = &self.nodes[node as usize].edges;
        edges
            .binary_search_by_key(&b, |&(e, _)| e)
            .ok()
            .map(|i| edges[i].1)
    }
}

/// First-byte lookup: the trie node reached by that byte plus the indices of
/// predicates that can start with it.
#[derive(Debug)]
pub(crate) struct DispatchTable {
    roots: Vec<Option<NodeId>>,
    patterns: Vec<Vec<u16>>,
}

#[derive(Debug)]
pub(crate) struct PatternEntry {
    predicate: Regex,
    kind: TokenKind,
}

/// A rule worth attempting at the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub kind: TokenKind,
    pub meta: u8,
    /// Length of the literal prefix that selected it; 0 for predicates.
    pub len: usize,
}

/// Trie, dispatch table, predicates and rules for one scope.
#[derive(Debug)]
pub(crate) struct CompiledScope {
    trie: Trie,
    dispatch: DispatchTable,
    patterns: Vec<PatternEntry>,
    rules: Vec<(TokenKind, Rule)>,
    special: [bool; 256],
}

#[derive(Debug)]
pub(crate) struct CompiledGrammar {
    pub block: CompiledScope,
    pub inline: CompiledScope,
}

impl CompiledGrammar {
    pub(crate) fn compile(grammar: Grammar) -> Self {
        Self {
            block: CompiledScope::compile(grammar.block),
            inline: CompiledScope::compile(grammar.inline),
        }
    }
}

impl CompiledScope {
    fn compile(defs: Vec<RuleDef>) -> Self {
        let mut trie = Trie::new();
        let mut patterns: Vec<PatternEntry> = Vec::new();
        let mut pattern_keys: Vec<Vec<u16>> = vec![Vec::new(); 256];
        // Bytes named explicitly by a predicate; wildcards do not count.
        let mut keyed = [false; 256];
        let mut rules = Vec::with_capacity(defs.len());

        for def in defs {
            match def.trigger {
                Trigger::Literals(literals) => {
                    for &(literal, meta) in literals {
                        trie.insert(
                            literal,
                            Accept {
                                kind: def.kind,
                                meta,
                            },
                        );
                    }
                }
                Trigger::Pattern { predicate, keys } => {
                    let idx = match patterns
                        .iter()
                        .position(|p| p.kind == def.kind && p.predicate.as_str() == predicate)
                    {
                        Some(existing) => existing,
                        None => {
                            patterns.push(PatternEntry {
                                predicate: Regex::new(predicate).expect("static grammar predicate"),
                                kind: def.kind,
                            });
                            patterns.len() - 1
                        }
                    } as u16;
                    let targets: Vec<usize> = match keys {
                        Some(keys) => keys.iter().map(|&b| b as usize).collect(),
                        None => (0..256).collect(),
                    };
                    if let Some(keys) = keys {
                        for &b in keys {
                            keyed[b as usize] = true;
                        }
                    }
                    for b in targets {
                        if !pattern_keys[b].contains(&idx) {
                            pattern_keys[b].push(idx);
                        }
                    }
                }
                Trigger::Fallback => {}
            }
            rules.push((def.kind, def.rule));
        }

        let roots = (0..=255u8).map(|b| trie.child(ROOT, b)).collect();
        let mut special = keyed;
        for (b, slot) in special.iter_mut().enumerate() {
            *slot |= trie.child(ROOT, b as u8).is_some();
        }

        Self {
            trie,
            dispatch: DispatchTable {
                roots,
                patterns: pattern_keys,
            },
            patterns,
            rules,
            special,
        }
    }

    /// Rules that could start at `pos`: trie terminals along the longest
    /// literal path (longest first), then matching predicates in grammar
    /// order.
    pub(crate) fn candidates(&self, text: &str, pos: usize) -> Vec<Candidate> {
        let bytes = text.as_bytes();
        let Some(&first) = bytes.get(pos) else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if let Some(mut node) = self.dispatch.roots[first as usize] {
            let mut depth = 1;
            loop {
                if let Some(accept) = self.trie.nodes[node as usize].terminal {
                    out.push(Candidate {
                        kind: accept.kind,
                        meta: accept.meta,
                        len: depth,
                    });
                }
                let Some(next) = bytes
                    .get(pos + depth)
                    .and_then(|&b| self.trie.child(node, b))
                else {
                    break;
                };
                node = next;
                depth += 1;
            }
            out.reverse();
        }

        let rest = &text[pos..];
        for &idx in &self.dispatch.patterns[first as usize] {
            let entry = &self.patterns[idx as usize];
            if entry.predicate.is_match(rest) && !out.iter().any(|c| c.kind == entry.kind) {
                out.push(Candidate {
                    kind: entry.kind,
                    meta: 0,
                    len: 0,
                });
            }
        }
        out
    }

    pub(crate) fn rule(&self, kind: TokenKind) -> Option<&Rule> {
        self.rules.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }

    /// Every kind in this scope that can be dispatched, in precedence order.
    pub(crate) fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.rules.iter().map(|(k, _)| *k)
    }

    /// Whether `b` can begin any rule in this scope.
    #[inline]
    pub(crate) fn is_special(&self, b: u8) -> bool {
        self.special[b as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(scope: &CompiledScope, text: &str) -> Vec<TokenKind> {
        scope.candidates(text, 0).into_iter().map(|c| c.kind).collect()
    }

    #[test]
    fn heading_levels_come_from_trie_metadata() {
        let c = GRAMMAR.block.candidates("### Title", 0);
        assert_eq!(
            c.first(),
            Some(&Candidate {
                kind: TokenKind::Heading,
                meta: 3,
                len: 4
            })
        );
    }

    #[test]
    fn hash_without_space_has_no_terminal() {
        assert!(kinds(&GRAMMAR.block, "#NoSpace").is_empty());
        assert!(kinds(&GRAMMAR.block, "####### seven").is_empty());
    }

    #[test]
    fn dash_line_dispatches_to_rule_and_list() {
        assert_eq!(kinds(&GRAMMAR.block, "---"), vec![TokenKind::HorizontalRule]);
        assert_eq!(kinds(&GRAMMAR.block, "- item"), vec![TokenKind::UnorderedList]);
        assert_eq!(kinds(&GRAMMAR.block, "1. item"), vec![TokenKind::OrderedList]);
    }

    #[test]
    fn pipe_lines_are_table_candidates() {
        assert_eq!(kinds(&GRAMMAR.block, "a | b"), vec![TokenKind::Table]);
        assert_eq!(
            kinds(&GRAMMAR.block, "- a | b"),
            vec![TokenKind::UnorderedList, TokenKind::Table]
        );
    }

    #[test]
    fn strong_is_tried_before_emphasis() {
        assert_eq!(
            kinds(&GRAMMAR.inline, "**x**"),
            vec![TokenKind::Strong, TokenKind::Emphasis]
        );
        assert_eq!(kinds(&GRAMMAR.inline, "![a](b)"), vec![TokenKind::Image]);
    }

    #[test]
    fn inline_specials_exclude_plain_letters() {
        assert!(GRAMMAR.inline.is_special(b'*'));
        assert!(GRAMMAR.inline.is_special(b'h'));
        assert!(!GRAMMAR.inline.is_special(b'a'));
        assert!(!GRAMMAR.inline.is_special(b' '));
    }

    #[test]
    fn compilation_is_deterministic() {
        let a = CompiledGrammar::compile(super::super::markdown());
        let b = CompiledGrammar::compile(super::super::markdown());
        assert_eq!(a.block.trie.nodes.len(), b.block.trie.nodes.len());
        assert_eq!(a.inline.dispatch.patterns, b.inline.dispatch.patterns);
        for text in ["# a", "```", "> q", "**", "[x](y)", "http://a"] {
            assert_eq!(a.block.candidates(text, 0), b.block.candidates(text, 0));
            assert_eq!(a.inline.candidates(text, 0), b.inline.candidates(text, 0));
        }
    }
}
