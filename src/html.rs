static NEEDS_ESCAPE: [bool; 256] = {
    let mut t = [false; 256];
    t[b'&' as usize] = true;
    t[b'<' as usize] = true;
    t[b'>' as usize] = true;
    t[b'"' as usize] = true;
    t[b'\'' as usize] = true;
    t
};

/// Schemes that are replaced with `#` unless unsafe URLs are allowed.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// `data:` URLs with this prefix are inline images and stay allowed.
const ALLOWED_DATA_PREFIX: &str = "data:image/";

#[inline]
pub(crate) fn escape_html_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let mut last = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if !NEEDS_ESCAPE[b as usize] {
            continue;
        }
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => "&#39;",
        };
        // Every escaped byte is ASCII, so `last..i` always lands on char boundaries.
        out.push_str(&input[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }

    out.push_str(&input[last..]);
}

/// Filter a link or image target.
///
/// Returns `#` for script-capable schemes unless `allow_unsafe` is set.
pub(crate) fn sanitize_url(url: &str, allow_unsafe: bool) -> &str {
    let trimmed = url.trim();
    if allow_unsafe {
        return trimmed;
    }
    // Browsers drop tab and newline anywhere in a URL and leading control
    // bytes before reading the scheme.
    let lower: String = trimmed
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let blocked = BLOCKED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme));
    if blocked && !lower.starts_with(ALLOWED_DATA_PREFIX) {
        log::debug!("rejected unsafe url scheme in {trimmed:?}");
        return "#";
    }
    trimmed
}

#[inline]
pub(crate) fn is_external_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[inline(always)]
pub(crate) fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
