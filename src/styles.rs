//! Static style table shared by inline-style rendering and [`emit_styles`].

use crate::render::Tag;
use std::fmt::Write;

/// Colour scheme for [`emit_styles`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

static LIGHT: &[(Tag, &str)] = &[
    (Tag::H1, "font-size: 2em; font-weight: 600; margin: .67em 0; text-align: left"),
    (Tag::H2, "font-size: 1.5em; font-weight: 600; margin: .83em 0"),
    (Tag::H3, "font-size: 1.25em; font-weight: 600; margin: 1em 0"),
    (Tag::H4, "font-size: 1em; font-weight: 600; margin: 1.33em 0"),
    (Tag::H5, "font-size: .875em; font-weight: 600; margin: 1.67em 0"),
    (Tag::H6, "font-size: .85em; font-weight: 600; margin: 2em 0"),
    (
        Tag::Pre,
        "background: #f4f4f4; padding: 10px; border-radius: 4px; overflow-x: auto; margin: 1em 0",
    ),
    (
        Tag::Code,
        "background: #f0f0f0; padding: 2px 4px; border-radius: 3px; font-family: monospace",
    ),
    (
        Tag::Blockquote,
        "border-left: 4px solid #ddd; margin-left: 0; padding-left: 1em",
    ),
    (Tag::Hr, "border: none; border-top: 1px solid #ddd; margin: 1em 0"),
    (Tag::Ul, "margin: .5em 0; padding-left: 2em"),
    (Tag::Ol, "margin: .5em 0; padding-left: 2em"),
    (Tag::Li, "margin: .25em 0"),
    (Tag::TaskItem, "list-style: none"),
    (Tag::TaskCheckbox, "margin-right: .5em"),
    (Tag::Table, "border-collapse: collapse; width: 100%; margin: 1em 0"),
    (
        Tag::Th,
        "border: 1px solid #ddd; padding: 8px; background-color: #f2f2f2; font-weight: bold; text-align: left",
    ),
    (Tag::Td, "border: 1px solid #ddd; padding: 8px; text-align: left"),
    (Tag::Strong, "font-weight: bold"),
    (Tag::Em, "font-style: italic"),
    (Tag::Del, "text-decoration: line-through"),
    (Tag::A, "color: #0066cc; text-decoration: underline"),
    (Tag::Img, "max-width: 100%; height: auto"),
];

// Only the colour-bearing rules change in the dark scheme.
static DARK: &[(Tag, &str)] = &[
    (
        Tag::Pre,
        "background: #2d2d2d; color: #f0f0f0; padding: 10px; border-radius: 4px; overflow-x: auto; margin: 1em 0",
    ),
    (
        Tag::Code,
        "background: #3a3a3a; color: #f0f0f0; padding: 2px 4px; border-radius: 3px; font-family: monospace",
    ),
    (
        Tag::Blockquote,
        "border-left: 4px solid #555; margin-left: 0; padding-left: 1em",
    ),
    (Tag::Hr, "border: none; border-top: 1px solid #555; margin: 1em 0"),
    (
        Tag::Th,
        "border: 1px solid #555; padding: 8px; background-color: #333; font-weight: bold; text-align: left",
    ),
    (Tag::Td, "border: 1px solid #555; padding: 8px; text-align: left"),
    (Tag::A, "color: #66b3ff; text-decoration: underline"),
];

#[inline]
pub(crate) fn style_for(tag: Tag) -> Option<&'static str> {
    lookup(LIGHT, tag)
}

fn lookup(table: &'static [(Tag, &'static str)], tag: Tag) -> Option<&'static str> {
    table.iter().find(|(t, _)| *t == tag).map(|(_, css)| *css)
}

/// Render the style table as a stylesheet of `.{prefix}{tag}` rules.
///
/// ```
/// use quikdown::{emit_styles, Theme};
///
/// let css = emit_styles("md-", Theme::Light);
/// assert!(css.contains(".md-h1 {"));
/// ```
pub fn emit_styles(prefix: &str, theme: Theme) -> String {
    let mut css = String::with_capacity(LIGHT.len() * 80);
    for &(tag, light) in LIGHT {
        let Some(class) = tag.class_name() else {
            continue;
        };
        let rule = match theme {
            Theme::Light => light,
            Theme::Dark => lookup(DARK, tag).unwrap_or(light),
        };
        let _ = writeln!(css, ".{prefix}{class} {{ {rule} }}");
    }
    css
}
