//! Nested list construction from a flat run of marker lines.
//!
//! Each indentation level (two columns per level) owns one open frame on a
//! stack. A frame is rendered when it closes, into the last item of its
//! parent frame or, at the bottom of the stack, into the output.

use super::leaf_blocks::{ListKind, list_item};
use crate::inline::render_inline;
use crate::render::{Renderer, Tag};
use std::borrow::Cow;

#[derive(Debug)]
struct Item<'a> {
    marker: &'a str,
    text: Cow<'a, str>,
    checked: Option<bool>,
    nested: String,
}

#[derive(Debug)]
struct ListFrame<'a> {
    kind: ListKind,
    level: usize,
    items: Vec<Item<'a>>,
}

/// Render the list lines captured by the block grammar.
pub(super) fn build(lines: &str, r: &Renderer<'_>) -> String {
    let mut out = String::with_capacity(lines.len() * 2);
    let mut stack: Vec<ListFrame<'_>> = Vec::new();

    for line in lines.lines() {
        let Some(marker) = list_item(line) else {
            // Continuation of the previous item.
            if let Some(item) = stack.last_mut().and_then(|f| f.items.last_mut()) {
                let text = item.text.to_mut();
                text.push(' ');
                text.push_str(line.trim());
            }
            continue;
        };
        let level = marker.indent / 2;

        while stack.last().is_some_and(|f| f.level > level) {
            close_frame(&mut stack, &mut out, r);
        }
        if let Some(top) = stack.last()
            && top.level == level
            && top.kind != marker.kind
        {
            close_frame(&mut stack, &mut out, r);
        }
        if stack.last().is_none_or(|f| f.level < level) {
            stack.push(ListFrame {
                kind: marker.kind,
                level,
                items: Vec::new(),
            });
        }

        let (checked, text) = match marker.kind {
            ListKind::Unordered => task_marker(marker.text),
            ListKind::Ordered => (None, marker.text),
        };
        if let Some(frame) = stack.last_mut() {
            frame.items.push(Item {
                marker: marker.marker,
                text: Cow::Borrowed(text),
                checked,
                nested: String::new(),
            });
        }
    }

    while !stack.is_empty() {
        close_frame(&mut stack, &mut out, r);
    }
    out
}

/// `[ ]`, `[x]` or `[X]` at the start of an unordered item.
fn task_marker(text: &str) -> (Option<bool>, &str) {
    let checked = match text.get(..3) {
        Some("[ ]") => false,
        Some("[x]" | "[X]") => true,
        _ => return (None, text),
    };
    let rest = &text[3..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return (None, text);
    }
    (Some(checked), rest.trim_start())
}

fn close_frame(stack: &mut Vec<ListFrame<'_>>, out: &mut String, r: &Renderer<'_>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let target = match stack.last_mut().and_then(|f| f.items.last_mut()) {
        Some(parent) => &mut parent.nested,
        None => out,
    };
    render_frame(target, &frame, r);
}

fn render_frame(out: &mut String, frame: &ListFrame<'_>, r: &Renderer<'_>) {
    let tag = match frame.kind {
        ListKind::Unordered => Tag::Ul,
        ListKind::Ordered => Tag::Ol,
    };
    let start = match frame.kind {
        ListKind::Ordered => frame
            .items
            .first()
            .and_then(|item| item.marker.trim_end_matches('.').parse::<u64>().ok())
            .filter(|&n| n != 1),
        ListKind::Unordered => None,
    };

    r.start(out, tag, None);
    if let Some(n) = start {
        out.push_str(" start=\"");
        out.push_str(&n.to_string());
        out.push('"');
    }
    out.push('>');

    for item in &frame.items {
        match item.checked {
            Some(checked) => {
                r.open(out, Tag::TaskItem, Some(item.marker));
                r.start(out, Tag::TaskCheckbox, None);
                out.push_str(" type=\"checkbox\" disabled");
                if checked {
                    out.push_str(" checked");
                }
                out.push_str("> ");
                render_inline(out, &item.text, r);
                out.push_str(&item.nested);
                r.close(out, Tag::TaskItem);
            }
            None => {
                r.open(out, Tag::Li, Some(item.marker));
                render_inline(out, &item.text, r);
                out.push_str(&item.nested);
                r.close(out, Tag::Li);
            }
        }
    }
    r.close(out, tag);
}
