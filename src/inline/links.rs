/// Characters that end a sentence rather than a bare URL.
const AUTOLINK_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Split a link target into destination and optional quoted title:
/// `url "title"` or `url 'title'`. Angle brackets around the destination are
/// dropped.
pub(super) fn split_target(target: &str) -> (&str, Option<&str>) {
    let target = target.trim();
    let (dest, title) = match title_split(target) {
        Some((dest, title)) => (dest, Some(title)),
        None => (target, None),
    };
    let dest = dest
        .strip_prefix('<')
        .and_then(|d| d.strip_suffix('>'))
        .unwrap_or(dest);
    (dest, title)
}

fn title_split(target: &str) -> Option<(&str, &str)> {
    let quote = target.chars().last().filter(|c| matches!(c, '"' | '\''))?;
    let inner = &target[..target.len() - 1];
    let open = inner.rfind(quote)?;
    let dest = &inner[..open];
    if !dest.ends_with([' ', '\t']) {
        return None;
    }
    let dest = dest.trim_end();
    if dest.is_empty() {
        return None;
    }
    Some((dest, &inner[open + 1..]))
}

/// Drop trailing sentence punctuation from a bare URL. `None` when nothing
/// is left after the scheme.
pub(super) fn trim_autolink(url: &str) -> Option<&str> {
    let url = url.trim_end_matches(AUTOLINK_TRAILING);
    let (_, rest) = url.split_once("://")?;
    (!rest.is_empty()).then_some(url)
}

/// One space of padding on both sides of a code span is dropped, unless the
/// span is nothing but spaces.
pub(super) fn trim_code(content: &str) -> &str {
    if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.bytes().all(|b| b == b' ')
    {
        &content[1..content.len() - 1]
    } else {
        content
    }
}
