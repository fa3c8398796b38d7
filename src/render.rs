use crate::ParseOptions;
use crate::html::escape_html_into;
use crate::styles::style_for;

/// Emission tags produced by grammar rules and builders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Pre,
    Code,
    Blockquote,
    Hr,
    Ul,
    Ol,
    Li,
    TaskItem,
    TaskCheckbox,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    Strong,
    Em,
    Del,
    A,
    Img,
    Br,
}

impl Tag {
    pub(crate) fn heading(level: u8) -> Tag {
        match level {
            1 => Tag::H1,
            2 => Tag::H2,
            3 => Tag::H3,
            4 => Tag::H4,
            5 => Tag::H5,
            _ => Tag::H6,
        }
    }

    /// The HTML element name.
    pub(crate) fn element(self) -> &'static str {
        match self {
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::P => "p",
            Tag::Pre => "pre",
            Tag::Code => "code",
            Tag::Blockquote => "blockquote",
            Tag::Hr => "hr",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li | Tag::TaskItem => "li",
            Tag::TaskCheckbox => "input",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
            Tag::Strong => "strong",
            Tag::Em => "em",
            Tag::Del => "del",
            Tag::A => "a",
            Tag::Img => "img",
            Tag::Br => "br",
        }
    }

    /// Suffix appended to the class prefix, `None` for tags rendered bare.
    pub(crate) fn class_name(self) -> Option<&'static str> {
        match self {
            Tag::P | Tag::Br => None,
            Tag::TaskItem => Some("task-item"),
            Tag::TaskCheckbox => Some("task-checkbox"),
            other => Some(other.element()),
        }
    }
}

/// Column alignment carried into `th`/`td` attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn css(self) -> Option<&'static str> {
        match self {
            Align::Left => None,
            Align::Center => Some("text-align: center"),
            Align::Right => Some("text-align: right"),
        }
    }
}

/// Writes element tags with either class or inline-style attributes.
///
/// The mode is fixed for the lifetime of one parse call.
#[derive(Clone, Copy)]
pub(crate) struct Renderer<'o> {
    opts: &'o ParseOptions,
}

impl<'o> Renderer<'o> {
    pub(crate) fn new(opts: &'o ParseOptions) -> Self {
        Self { opts }
    }

    #[inline]
    pub(crate) fn opts(&self) -> &'o ParseOptions {
        self.opts
    }

    /// `<tag attrs>`
    pub(crate) fn open(&self, out: &mut String, tag: Tag, marker: Option<&str>) {
        self.start(out, tag, marker);
        out.push('>');
    }

    /// `<tag attrs` without the closing `>`, for elements with extra attributes.
    pub(crate) fn start(&self, out: &mut String, tag: Tag, marker: Option<&str>) {
        out.push('<');
        out.push_str(tag.element());
        self.push_attr(out, tag, None);
        self.push_marker(out, marker);
    }

    pub(crate) fn open_aligned(&self, out: &mut String, tag: Tag, align: Align) {
        out.push('<');
        out.push_str(tag.element());
        self.push_attr(out, tag, align.css());
        out.push('>');
    }

    #[inline]
    pub(crate) fn close(&self, out: &mut String, tag: Tag) {
        out.push_str("</");
        out.push_str(tag.element());
        out.push('>');
    }

    /// Emits `class="…"` or `style="…"`; `extra` is a style fragment that
    /// must survive in both modes.
    fn push_attr(&self, out: &mut String, tag: Tag, extra: Option<&str>) {
        if self.opts.inline_styles {
            let css = match (style_for(tag), extra) {
                (Some(base), Some(extra)) => Some(merge_style(base, extra)),
                (Some(base), None) => Some(base.to_string()),
                (None, Some(extra)) => Some(extra.to_string()),
                (None, None) => None,
            };
            if let Some(css) = css {
                out.push_str(" style=\"");
                escape_html_into(out, &css);
                out.push('"');
            }
            return;
        }
        if let Some(class) = tag.class_name() {
            out.push_str(" class=\"");
            escape_html_into(out, &self.opts.class_prefix);
            out.push_str(class);
            out.push('"');
        }
        if let Some(extra) = extra {
            out.push_str(" style=\"");
            out.push_str(extra);
            out.push('"');
        }
    }

    pub(crate) fn push_marker(&self, out: &mut String, marker: Option<&str>) {
        if !self.opts.bidirectional {
            return;
        }
        if let Some(marker) = marker {
            out.push_str(" data-qd=\"");
            escape_html_into(out, marker);
            out.push('"');
        }
    }
}

/// Append `extra` to `base`, dropping any property in `base` that `extra` sets.
fn merge_style(base: &str, extra: &str) -> String {
    let overridden: Vec<&str> = extra
        .split(';')
        .filter_map(|decl| decl.split(':').next())
        .map(str::trim)
        .filter(|prop| !prop.is_empty())
        .collect();
    let mut merged: Vec<&str> = base
        .split(';')
        .map(str::trim)
        .filter(|decl| {
            let prop = decl.split(':').next().unwrap_or("").trim();
            !decl.is_empty() && !overridden.contains(&prop)
        })
        .collect();
    merged.push(extra.trim());
    merged.join("; ")
}
