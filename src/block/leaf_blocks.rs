use crate::html::trim_cr;

#[inline]
pub(crate) fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b.is_ascii_whitespace())
}

/// Whether `line` starts a block and so ends a running paragraph.
pub(crate) fn breaks_paragraph(line: &str, allow_pipes: bool) -> bool {
    let trimmed = line.trim_start();
    match trimmed.as_bytes().first() {
        Some(b'#' | b'>' | b'-' | b'*' | b'+' | b'`' | b'~') => true,
        Some(b'|') => !allow_pipes,
        Some(b) if b.is_ascii_digit() => {
            let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
            trimmed.as_bytes().get(digits) == Some(&b'.')
        }
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    Unordered,
    Ordered,
}

/// One list marker line split into its parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ListItemLine<'a> {
    /// Leading whitespace in columns; a tab counts as two.
    pub indent: usize,
    pub kind: ListKind,
    /// `-`, `*`, `+` or digits followed by `.`.
    pub marker: &'a str,
    pub text: &'a str,
}

pub(crate) fn list_item(line: &str) -> Option<ListItemLine<'_>> {
    let line = trim_cr(line);
    let bytes = line.as_bytes();
    let mut indent = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' => indent += 1,
            b'\t' => indent += 2,
            _ => break,
        }
        i += 1;
    }

    let marker_start = i;
    let kind = match bytes.get(i)? {
        b'*' | b'+' | b'-' => {
            i += 1;
            ListKind::Unordered
        }
        b'0'..=b'9' => {
            while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
            if bytes.get(i) != Some(&b'.') {
                return None;
            }
            i += 1;
            ListKind::Ordered
        }
        _ => return None,
    };
    let marker = &line[marker_start..i];

    if !matches!(bytes.get(i), Some(b' ' | b'\t')) {
        return None;
    }
    let text = line[i..].trim();
    if text.is_empty() {
        return None;
    }
    Some(ListItemLine {
        indent,
        kind,
        marker,
        text,
    })
}

/// Indented (two or more spaces) non-blank text that continues the previous
/// list item.
pub(crate) fn is_list_continuation(line: &str) -> bool {
    line.starts_with("  ") && !is_blank(line) && list_item(line).is_none()
}

/// A closing fence repeats the opening marker's character at least as many
/// times and carries nothing else.
pub(crate) fn is_closing_fence(line: &str, marker: &str) -> bool {
    let Some(ch) = marker.bytes().next() else {
        return false;
    };
    let line = trim_cr(line).trim_end();
    let run = line.bytes().take_while(|&b| b == ch).count();
    run >= marker.len() && run == line.len()
}

/// The language of a fence: the first word of its info string.
pub(crate) fn fence_language(info: &str) -> &str {
    info.split_whitespace().next().unwrap_or("")
}

pub(crate) fn strip_closing_hashes(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'#' {
        end -= 1;
    }
    if end == bytes.len() {
        return s;
    }
    if end == 0 {
        return "";
    }
    if bytes[end - 1] == b' ' || bytes[end - 1] == b'\t' {
        s[..end].trim_end()
    } else {
        // `C#` keeps its hash.
        s
    }
}
