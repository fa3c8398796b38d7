use crate::html::trim_cr;
use crate::inline::render_inline;
use crate::render::{Align, Renderer, Tag};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?[\s\-:|]+\|?$").expect("static separator pattern"));

/// A validated pipe table. Cells borrow the input and are rendered inline.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct TableModel<'a> {
    header: Vec<&'a str>,
    alignments: Vec<Align>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> TableModel<'a> {
    /// Build from buffered pipe lines. `None` when the second line is not a
    /// separator row.
    pub(super) fn parse(lines: &'a str) -> Option<Self> {
        let mut lines = lines.lines().map(|l| trim_cr(l).trim());
        let header = split_cells(lines.next()?);
        let separator = lines.next()?;
        if !is_separator(separator) {
            return None;
        }
        let alignments = split_cells(separator)
            .into_iter()
            .map(alignment)
            .collect();
        let rows = lines.map(split_cells).collect();
        Some(Self {
            header,
            alignments,
            rows,
        })
    }

    fn align(&self, column: usize) -> Align {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    pub(super) fn render(&self, out: &mut String, r: &Renderer<'_>) {
        r.open(out, Tag::Table, Some("|"));
        out.push('\n');
        r.open(out, Tag::Thead, None);
        out.push('\n');
        r.open(out, Tag::Tr, None);
        out.push('\n');
        for (i, cell) in self.header.iter().enumerate() {
            self.cell(out, r, Tag::Th, i, cell);
        }
        out.push_str("</tr>\n</thead>\n");

        if !self.rows.is_empty() {
            r.open(out, Tag::Tbody, None);
            out.push('\n');
            for row in &self.rows {
                r.open(out, Tag::Tr, None);
                out.push('\n');
                // Rows are cut or padded to the header width.
                for i in 0..self.header.len() {
                    self.cell(out, r, Tag::Td, i, row.get(i).copied().unwrap_or(""));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n");
        }
        out.push_str("</table>");
    }

    fn cell(&self, out: &mut String, r: &Renderer<'_>, tag: Tag, column: usize, text: &str) {
        r.open_aligned(out, tag, self.align(column));
        render_inline(out, text, r);
        r.close(out, tag);
        out.push('\n');
    }
}

/// Byte offset of the first line, after the first, where a valid table
/// begins inside a pipe run that fails as a whole.
pub(super) fn later_table_start(rows: &str) -> Option<usize> {
    let mut offset = 0;
    for line in rows.split_inclusive('\n') {
        if offset > 0 && TableModel::parse(&rows[offset..]).is_some() {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn is_separator(line: &str) -> bool {
    line.contains('-') && SEPARATOR.is_match(line)
}

fn alignment(cell: &str) -> Align {
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) if cell.len() > 1 => Align::Center,
        (_, true) => Align::Right,
        _ => Align::Left,
    }
}

/// Split on unescaped pipes. One pipe at each edge is optional and dropped.
fn split_cells(line: &str) -> Vec<&str> {
    let mut body = line.strip_prefix('|').unwrap_or(line);
    if body.ends_with('|') && !body.ends_with("\\|") {
        body = &body[..body.len() - 1];
    }

    let bytes = body.as_bytes();
    let mut cells = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                cells.push(body[start..i].trim());
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    cells.push(body[start.min(body.len())..].trim());
    cells
}
