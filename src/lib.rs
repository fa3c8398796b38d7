//! # quikdown
//!
//! A small Markdown-to-HTML engine for chat and LLM output, driven by a
//! declarative grammar compiled once into a byte trie and dispatch table.
//!
//! ## Usage
//!
//! ```
//! use quikdown::{parse, ParseOptions};
//!
//! let html = parse("# Hello, **world**!", &ParseOptions::default()).unwrap();
//! assert_eq!(
//!     html,
//!     "<h1 class=\"quikdown-h1\">Hello, <strong class=\"quikdown-strong\">world</strong>!</h1>"
//! );
//!
//! // Inline styles instead of classes
//! let opts = ParseOptions {
//!     inline_styles: true,
//!     ..Default::default()
//! };
//! let html = parse("~~gone~~", &opts).unwrap();
//! assert!(html.contains("<del style="));
//! ```
//!
//! ## Syntax
//!
//! | Syntax | HTML |
//! |---|---|
//! | `#` … `######` + space | `<h1>` … `<h6>` |
//! | ```` ``` ```` / `~~~` fences | `<pre><code>` |
//! | `---` | `<hr>` |
//! | `> quote` | `<blockquote>` |
//! | `-`, `*`, `+`, `1.` | `<ul>` / `<ol>` |
//! | `- [x] task` | checkbox item |
//! | `\| pipe \| table \|` | `<table>` |
//! | `**b**` `*i*` `~~s~~` `` `c` `` | `<strong>` `<em>` `<del>` `<code>` |
//! | `[text](url)` `![alt](src)` bare URLs | `<a>` / `<img>` |

mod block;
mod error;
mod grammar;
mod html;
mod inline;
mod render;
mod scanner;
mod styles;

pub use error::{BoxError, Error, Result};
pub use styles::{Theme, emit_styles};

use std::fmt;
use std::sync::Arc;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

type FenceFn = dyn Fn(&str, &str) -> std::result::Result<Option<String>, BoxError> + Send + Sync;

/// Custom renderer for fenced code blocks.
///
/// Called with the raw, unescaped fence content and the fence language.
/// Returning `Ok(Some(html))` replaces the whole block verbatim, `Ok(None)`
/// keeps the default `<pre><code>` rendering, and `Err` aborts the parse
/// with [`Error::FencePlugin`].
///
/// ```
/// use quikdown::{parse, FencePlugin, ParseOptions};
///
/// let opts = ParseOptions {
///     fence_plugin: Some(FencePlugin::infallible(|content, lang| {
///         (lang == "math").then(|| format!("<div class=\"math\">{content}</div>"))
///     })),
///     ..Default::default()
/// };
/// let html = parse("```math\nx^2\n```", &opts).unwrap();
/// assert_eq!(html, "<div class=\"math\">x^2</div>");
/// ```
#[derive(Clone)]
pub struct FencePlugin(Arc<FenceFn>);

impl FencePlugin {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> std::result::Result<Option<String>, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a plugin that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(move |content, lang| Ok(f(content, lang)))
    }

    pub fn render(&self, content: &str, lang: &str) -> std::result::Result<Option<String>, BoxError> {
        (self.0)(content, lang)
    }
}

impl fmt::Debug for FencePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FencePlugin(..)")
    }
}

/// Options for one parse call.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ParseOptions {
    /// Emit `style="…"` from the built-in style table instead of
    /// `class="{class_prefix}{tag}"`. Default: `false`.
    pub inline_styles: bool,
    /// Prefix for generated class names. Default: `"quikdown-"`.
    pub class_prefix: String,
    /// Custom fenced code renderer. Default: `None`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub fence_plugin: Option<FencePlugin>,
    /// Render every single newline inside a paragraph as `<br>`.
    /// Default: `false`.
    pub lazy_linefeeds: bool,
    /// Keep `javascript:`, `vbscript:` and non-image `data:` URLs.
    /// Default: `false`.
    pub allow_unsafe_urls: bool,
    /// Add `data-qd` attributes recording the original Markdown markers, for
    /// HTML-to-Markdown reconstruction. Default: `false`.
    pub bidirectional: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            inline_styles: false,
            class_prefix: "quikdown-".to_string(),
            fence_plugin: None,
            lazy_linefeeds: false,
            allow_unsafe_urls: false,
            bidirectional: false,
        }
    }
}

/// Parse a Markdown string and return the rendered HTML.
///
/// Malformed Markdown never fails; it is rendered as text. The only error
/// is a failing [`FencePlugin`].
///
/// # Examples
///
/// ```
/// use quikdown::{parse, ParseOptions};
///
/// let html = parse("[x](javascript:alert(1))", &ParseOptions::default()).unwrap();
/// assert!(html.contains("href=\"#\""));
/// assert!(!html.contains("javascript:"));
/// ```
pub fn parse(markdown: &str, options: &ParseOptions) -> Result<String> {
    if markdown.is_empty() {
        return Ok(String::new());
    }
    block::parse_document(markdown, options)
}

/// Like [`parse`] for raw bytes. Input that is not UTF-8 renders as an
/// empty string.
pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<String> {
    match std::str::from_utf8(input) {
        Ok(markdown) => parse(markdown, options),
        Err(err) => {
            log::debug!("input is not valid UTF-8: {err}");
            Ok(String::new())
        }
    }
}

/// Bind `options` once and get a reusable parser.
///
/// ```
/// let parse = quikdown::configure(quikdown::ParseOptions {
///     class_prefix: "md-".into(),
///     ..Default::default()
/// });
/// assert_eq!(parse("---").unwrap(), "<hr class=\"md-hr\">");
/// ```
pub fn configure(options: ParseOptions) -> impl Fn(&str) -> Result<String> {
    move |markdown| parse(markdown, &options)
}
