use super::Inline;
use crate::html::{escape_html_into, is_external_url, sanitize_url};
use crate::render::{Renderer, Tag};

pub(super) fn render_inlines(out: &mut String, tokens: &[Inline<'_>], r: &Renderer<'_>) {
    let allow_unsafe = r.opts().allow_unsafe_urls;
    for token in tokens {
        match token {
            Inline::Text(text) => escape_html_into(out, text),
            Inline::Span {
                tag,
                marker,
                children,
            } => {
                r.open(out, *tag, Some(*marker));
                render_inlines(out, children, r);
                r.close(out, *tag);
            }
            Inline::Code { marker, content } => {
                r.open(out, Tag::Code, Some(*marker));
                escape_html_into(out, content);
                r.close(out, Tag::Code);
            }
            Inline::Link {
                children,
                href,
                title,
            } => {
                let href = sanitize_url(href, allow_unsafe);
                open_link(out, r, href, *title, "[");
                render_inlines(out, children, r);
                r.close(out, Tag::A);
            }
            Inline::Image { alt, src, title } => {
                let src = sanitize_url(src, allow_unsafe);
                r.start(out, Tag::Img, Some("!"));
                out.push_str(" src=\"");
                escape_html_into(out, src);
                out.push_str("\" alt=\"");
                escape_html_into(out, alt);
                out.push('"');
                push_title(out, *title);
                out.push('>');
            }
            Inline::AutoLink(url) => {
                let href = sanitize_url(url, allow_unsafe);
                open_link(out, r, href, None, "auto");
                escape_html_into(out, url);
                r.close(out, Tag::A);
            }
            Inline::Break { hard } => {
                if *hard || r.opts().lazy_linefeeds {
                    r.open(out, Tag::Br, None);
                } else {
                    out.push('\n');
                }
            }
        }
    }
}

fn open_link(out: &mut String, r: &Renderer<'_>, href: &str, title: Option<&str>, marker: &str) {
    r.start(out, Tag::A, Some(marker));
    out.push_str(" href=\"");
    escape_html_into(out, href);
    out.push('"');
    push_title(out, title);
    if is_external_url(href) {
        out.push_str(" rel=\"noopener noreferrer\"");
    }
    out.push('>');
}

fn push_title(out: &mut String, title: Option<&str>) {
    if let Some(title) = title {
        out.push_str(" title=\"");
        escape_html_into(out, title);
        out.push('"');
    }
}
