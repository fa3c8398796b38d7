pub(crate) mod leaf_blocks;
mod list;
mod table;

use leaf_blocks::*;

use crate::ParseOptions;
use crate::error::{Error, Result};
use crate::grammar::TokenKind;
use crate::grammar::compiler::{Candidate, GRAMMAR};
use crate::grammar::matcher::{Captures, match_rule, paragraph_lines};
use crate::html::escape_html_into;
use crate::inline::render_inline;
use crate::render::{Renderer, Tag};
use crate::scanner::Scanner;
use table::TableModel;

/// Outer element of a rendered block, used by the adjacency pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Heading,
    Fence,
    Rule,
    BlockQuote,
    List,
    Table,
    Paragraph,
}

#[derive(Debug)]
pub(crate) struct Block {
    kind: BlockKind,
    html: String,
}

#[derive(Debug)]
enum BlockResult {
    Fragment(Block),
    /// A run of blank lines.
    Skip,
}

/// Segment `input` into blocks and render them to HTML.
pub(crate) fn parse_document(input: &str, opts: &ParseOptions) -> Result<String> {
    let mut parser = BlockParser::new(input, opts);
    let mut blocks = Vec::new();
    while let Some(result) = parser.next_block()? {
        if let BlockResult::Fragment(block) = result {
            blocks.push(block);
        }
    }
    Ok(join_blocks(&blocks, input.len()))
}

struct BlockParser<'a, 'o> {
    sc: Scanner<'a>,
    renderer: Renderer<'o>,
}

impl<'a, 'o> BlockParser<'a, 'o> {
    fn new(input: &'a str, opts: &'o ParseOptions) -> Self {
        Self {
            sc: Scanner::new(input),
            renderer: Renderer::new(opts),
        }
    }

    fn next_block(&mut self) -> Result<Option<BlockResult>> {
        if self.sc.is_eof() {
            return Ok(None);
        }
        if is_blank(self.sc.current_line()) {
            while !self.sc.is_eof() && is_blank(self.sc.current_line()) {
                self.sc.skip_line();
            }
            return Ok(Some(BlockResult::Skip));
        }

        for candidate in self.candidates() {
            if let Some(block) = self.attempt(candidate)? {
                return Ok(Some(BlockResult::Fragment(block)));
            }
        }
        Ok(Some(BlockResult::Fragment(self.paragraph(false))))
    }

    /// Dispatched candidates in precedence order. When dispatch finds nothing
    /// every non-fallback kind is tried.
    fn candidates(&self) -> Vec<Candidate> {
        let scope = &GRAMMAR.block;
        let mut found = scope.candidates(self.sc.input(), self.sc.pos());
        if found.is_empty() {
            log::trace!("no block dispatch at offset {}, trying every kind", self.sc.pos());
            found = scope
                .kinds()
                .filter(|&kind| kind != TokenKind::Paragraph)
                .map(|kind| Candidate {
                    kind,
                    meta: 0,
                    len: 0,
                })
                .collect();
        }
        found.sort_by_key(|c| c.kind);
        found.dedup_by_key(|c| c.kind);
        found
    }

    fn attempt(&mut self, candidate: Candidate) -> Result<Option<Block>> {
        let Some(rule) = GRAMMAR.block.rule(candidate.kind) else {
            return Ok(None);
        };
        let start = self.sc.save();
        let mut caps = Captures::default();
        if !match_rule(rule, &mut self.sc, &mut caps) {
            return Ok(None);
        }

        let block = match candidate.kind {
            TokenKind::Heading => self.heading(&caps, candidate.meta),
            TokenKind::Fence => self.fence(&caps)?,
            TokenKind::HorizontalRule => self.rule(&caps),
            TokenKind::BlockQuote => self.blockquote(&caps),
            TokenKind::UnorderedList | TokenKind::OrderedList => Block {
                kind: BlockKind::List,
                html: list::build(caps.text("items"), &self.renderer),
            },
            TokenKind::Table => match TableModel::parse(caps.text("rows")) {
                Some(model) => {
                    let mut html = String::new();
                    model.render(&mut html, &self.renderer);
                    Block {
                        kind: BlockKind::Table,
                        html,
                    }
                }
                None => {
                    let rows = caps.text("rows");
                    log::debug!("pipe lines at offset {start} have no separator row, keeping as text");
                    self.sc.restore(start);
                    match table::later_table_start(rows) {
                        // Only the lines before the table become text.
                        Some(offset) => {
                            let text = self.sc.advance(offset);
                            self.paragraph_block(text)
                        }
                        None => self.paragraph(true),
                    }
                }
            },
            _ => {
                self.sc.restore(start);
                return Ok(None);
            }
        };
        Ok(Some(block))
    }

    fn heading(&self, caps: &Captures<'a>, meta: u8) -> Block {
        let marker = caps.text("marker");
        let level = if meta > 0 { meta } else { marker.len() as u8 };
        let tag = Tag::heading(level);
        let content = strip_closing_hashes(caps.text("content").trim());

        let mut html = String::with_capacity(content.len() + 32);
        self.renderer.open(&mut html, tag, Some(marker));
        render_inline(&mut html, content, &self.renderer);
        self.renderer.close(&mut html, tag);
        Block {
            kind: BlockKind::Heading,
            html,
        }
    }

    fn fence(&self, caps: &Captures<'a>) -> Result<Block> {
        let marker = caps.text("fence");
        let lang = fence_language(caps.text("info"));
        let body = caps.text("body");
        let opts = self.renderer.opts();

        if let Some(plugin) = &opts.fence_plugin
            && let Some(html) = plugin.render(body, lang).map_err(Error::FencePlugin)?
        {
            return Ok(Block {
                kind: BlockKind::Fence,
                html,
            });
        }

        let mut html = String::with_capacity(body.len() + 48);
        self.renderer.start(&mut html, Tag::Pre, Some(marker));
        if opts.bidirectional && !lang.is_empty() {
            html.push_str(" data-qd-lang=\"");
            escape_html_into(&mut html, lang);
            html.push('"');
        }
        html.push_str("><code");
        if !lang.is_empty() {
            html.push_str(" class=\"language-");
            escape_html_into(&mut html, lang);
            html.push('"');
        }
        html.push('>');
        escape_html_into(&mut html, body);
        html.push_str("</code></pre>");
        Ok(Block {
            kind: BlockKind::Fence,
            html,
        })
    }

    fn rule(&self, caps: &Captures<'a>) -> Block {
        let mut html = String::new();
        self.renderer.open(&mut html, Tag::Hr, Some(caps.text("marker")));
        Block {
            kind: BlockKind::Rule,
            html,
        }
    }

    fn blockquote(&self, caps: &Captures<'a>) -> Block {
        let content = caps.text("content").trim();
        let mut html = String::with_capacity(content.len() + 48);
        self.renderer
            .open(&mut html, Tag::Blockquote, Some(caps.text("marker")));
        render_inline(&mut html, content, &self.renderer);
        self.renderer.close(&mut html, Tag::Blockquote);
        Block {
            kind: BlockKind::BlockQuote,
            html,
        }
    }

    /// Consume a paragraph at the cursor. `allow_pipes` is set when a table
    /// failed validation so its lines come back as text.
    fn paragraph(&mut self, allow_pipes: bool) -> Block {
        let text = match paragraph_lines(&mut self.sc, allow_pipes) {
            Some(text) => text,
            None => self.sc.skip_line(),
        };
        self.paragraph_block(text)
    }

    fn paragraph_block(&self, text: &str) -> Block {
        let mut html = String::with_capacity(text.len() + 8);
        self.renderer.open(&mut html, Tag::P, None);
        render_inline(&mut html, text.trim(), &self.renderer);
        self.renderer.close(&mut html, Tag::P);
        Block {
            kind: BlockKind::Paragraph,
            html,
        }
    }
}

/// Concatenate blocks, separating same-kind neighbours that would otherwise
/// run together and dropping empty paragraphs left behind a heading or list.
fn join_blocks(blocks: &[Block], hint: usize) -> String {
    let mut out = String::with_capacity(hint + hint / 2);
    let mut prev: Option<BlockKind> = None;
    for block in blocks {
        if block.kind == BlockKind::Paragraph
            && block.html == "<p></p>"
            && matches!(prev, Some(BlockKind::Heading | BlockKind::List))
        {
            continue;
        }
        if prev == Some(block.kind) && matches!(block.kind, BlockKind::Heading | BlockKind::BlockQuote) {
            out.push('\n');
        }
        out.push_str(&block.html);
        prev = Some(block.kind);
    }
    out
}
