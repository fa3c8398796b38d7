use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use quikdown::{Error, FencePlugin, ParseOptions, configure, parse, parse_bytes};
use regex::Regex;
use rstest::rstest;
use std::error::Error as _;
use std::sync::{Arc, Mutex};

static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#" class="quikdown-[a-z0-9-]+""#).unwrap());

fn render(md: &str, opts: &ParseOptions) -> String {
    parse(md, opts).unwrap()
}

/// Rendered with default options and the generated class attributes removed,
/// so expectations read as plain HTML.
fn plain(md: &str) -> String {
    let html = render(md, &ParseOptions::default());
    CLASS_ATTR.replace_all(&html, "").into_owned()
}

fn assert_html(md: &str, expected: &str) {
    assert_eq!(plain(md), expected);
}

fn bidi() -> ParseOptions {
    ParseOptions {
        bidirectional: true,
        ..Default::default()
    }
}

#[test]
fn parses_empty_and_whitespace_input() {
    assert_html("", "");
    assert_html("   \n\n\t\n", "");
}

#[rstest]
#[case("# h1", "<h1>h1</h1>")]
#[case("### h3", "<h3>h3</h3>")]
#[case("###### h6", "<h6>h6</h6>")]
#[case("# Spaced", "<h1>Spaced</h1>")]
#[case("#NoSpace", "<p>#NoSpace</p>")]
#[case("####### seven", "<p>####### seven</p>")]
#[case("# Title ##", "<h1>Title</h1>")]
#[case("## C#", "<h2>C#</h2>")]
#[case("#   padded   ", "<h1>padded</h1>")]
fn headings(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[test]
fn heading_keeps_class() {
    assert_eq!(
        render("# Spaced", &ParseOptions::default()),
        "<h1 class=\"quikdown-h1\">Spaced</h1>"
    );
}

#[test]
fn adjacent_headings_are_separated() {
    assert_html("# a\n## b\n\ntext", "<h1>a</h1>\n<h2>b</h2><p>text</p>");
}

#[test]
fn paragraph_collapses_lines_until_block_boundary() {
    assert_html(
        "line one\nline two\n\n# h\nline three",
        "<p>line one\nline two</p><h1>h</h1><p>line three</p>",
    );
}

#[test]
fn crlf_line_endings() {
    assert_html("# a\r\nb\r\n", "<h1>a</h1><p>b</p>");
}

#[rstest]
#[case("```\ncode\n```", "<pre><code>code</code></pre>")]
#[case("```js\ncode\n```", "<pre><code class=\"language-js\">code</code></pre>")]
#[case("~~~\na < b\n~~~", "<pre><code>a &lt; b</code></pre>")]
#[case("````\n```\n````", "<pre><code>```</code></pre>")]
#[case("```\nunclosed\n\nstill code", "<pre><code>unclosed\n\nstill code</code></pre>")]
#[case("```\na\n```\nafter", "<pre><code>a</code></pre><p>after</p>")]
#[case("```rust ignore\nx\n```", "<pre><code class=\"language-rust\">x</code></pre>")]
fn fences(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[test]
fn fence_content_is_never_inline_parsed() {
    let html = plain("```\n**x** [l](u) `c`\n```");
    assert!(html.contains("**x** [l](u) `c`"));
    assert!(!html.contains("<strong"));
    assert!(!html.contains("<a "));
}

#[rstest]
#[case("---", "<hr>")]
#[case("-----   ", "<hr>")]
#[case("--- text", "<p>--- text</p>")]
#[case("- item\n---", "<ul><li>item</li></ul><hr>")]
fn horizontal_rules(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[test]
fn blockquotes_are_line_scoped() {
    assert_html(
        "> a\n> b",
        "<blockquote>a</blockquote>\n<blockquote>b</blockquote>",
    );
    assert_html(">tight", "<blockquote>tight</blockquote>");
    assert_html("> **b**", "<blockquote><strong>b</strong></blockquote>");
}

#[rstest]
#[case("- a\n- b", "<ul><li>a</li><li>b</li></ul>")]
#[case("* a\n+ b", "<ul><li>a</li><li>b</li></ul>")]
#[case("1. a\n2. b", "<ol><li>a</li><li>b</li></ol>")]
#[case("3. c", "<ol start=\"3\"><li>c</li></ol>")]
#[case("- a\n  b", "<ul><li>a b</li></ul>")]
#[case("- a\n\npara", "<ul><li>a</li></ul><p>para</p>")]
#[case("- a\ntext", "<ul><li>a</li></ul><p>text</p>")]
#[case("- a\n  1. b\n- c", "<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>")]
#[case("- a\n1. b", "<ul><li>a</li></ul><ol><li>b</li></ol>")]
fn lists(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[rstest]
fn list_nesting_depth(#[values(1, 2, 3, 5)] depth: usize) {
    let md: String = (0..depth)
        .map(|i| format!("{}- item {i}\n", "  ".repeat(i)))
        .collect();
    let mut expected = String::new();
    for i in 0..depth {
        expected.push_str(&format!("<ul><li>item {i}"));
    }
    expected.push_str(&"</li></ul>".repeat(depth));

    let html = plain(&md);
    assert_eq!(html.matches("<li>").count(), depth);
    assert_eq!(html, expected);
}

#[test]
fn task_lists() {
    assert_html(
        "- [ ] todo\n- [x] done\n- [X] also",
        "<ul><li><input type=\"checkbox\" disabled> todo</li>\
         <li><input type=\"checkbox\" disabled checked> done</li>\
         <li><input type=\"checkbox\" disabled checked> also</li></ul>",
    );
    assert_html("1. [x] numbered", "<ol><li>[x] numbered</li></ol>");
}

#[test]
fn task_items_use_their_own_classes() {
    let html = render("- [x] done", &ParseOptions::default());
    assert!(html.contains("<li class=\"quikdown-task-item\">"));
    assert!(html.contains("<input class=\"quikdown-task-checkbox\" type=\"checkbox\" disabled checked>"));
}

#[test]
fn table_with_alignment() {
    assert_html(
        "| a | b |\n|---|:-:|\n| 1 | 2 |",
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th style=\"text-align: center\">b</th>\n</tr>\n</thead>\n\
         <tbody>\n<tr>\n<td>1</td>\n<td style=\"text-align: center\">2</td>\n</tr>\n</tbody>\n</table>",
    );
}

#[test]
fn table_without_body_rows() {
    assert_html(
        "a|b\n-|-",
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n</table>",
    );
}

#[test]
fn table_cells_render_inline() {
    let html = plain("| **a** | `b` |\n|---|---|\n| [l](/u) | \\| |");
    assert!(html.contains("<th><strong>a</strong></th>"));
    assert!(html.contains("<th><code>b</code></th>"));
    assert!(html.contains("<td><a href=\"/u\">l</a></td>"));
    assert!(html.contains("<td>|</td>"));
}

#[rstest]
#[case("| a | b |\n| c | d |")]
#[case("a | b\nc | d")]
#[case("| x |\n| : |")]
fn invalid_table_is_echoed_as_text(#[case] md: &str) {
    let html = plain(md);
    assert!(!html.contains("<table"));
    assert_eq!(html, format!("<p>{md}</p>"));
}

#[test]
fn table_after_stray_pipe_lines() {
    assert_html(
        "| a |\n| b |\n|---|\n| c |",
        "<p>| a |</p><table>\n<thead>\n<tr>\n<th>b</th>\n</tr>\n</thead>\n\
         <tbody>\n<tr>\n<td>c</td>\n</tr>\n</tbody>\n</table>",
    );
}

#[test]
fn single_pipe_line_is_a_paragraph() {
    assert_html("a | b\nnot table", "<p>a | b\nnot table</p>");
}

#[rstest]
#[case(
    "this is **strong** and *em* and `code`",
    "<p>this is <strong>strong</strong> and <em>em</em> and <code>code</code></p>"
)]
#[case("__strong__ _em_", "<p><strong>strong</strong> <em>em</em></p>")]
#[case("~~del~~", "<p><del>del</del></p>")]
#[case("**bold *both* bold**", "<p><strong>bold <em>both</em> bold</strong></p>")]
#[case("***both***", "<p><strong><em>both</em></strong></p>")]
#[case("**unclosed", "<p>**unclosed</p>")]
#[case("*a **b", "<p>*a **b</p>")]
#[case("a * b * c", "<p>a * b * c</p>")]
#[case("snake_case_name", "<p>snake_case_name</p>")]
#[case("`**x**`", "<p><code>**x**</code></p>")]
#[case("``a ` b``", "<p><code>a ` b</code></p>")]
#[case("`a``b`", "<p><code>a``b</code></p>")]
#[case("``x```y``", "<p><code>x```y</code></p>")]
#[case(r"\*not em\*", "<p>*not em*</p>")]
#[case(r"\q stays", "<p>\\q stays</p>")]
#[case("**é**", "<p><strong>é</strong></p>")]
fn inline_markup(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[rstest]
#[case("[a](/p)", "<p><a href=\"/p\">a</a></p>")]
#[case(
    "[a](https://e.com)",
    "<p><a href=\"https://e.com\" rel=\"noopener noreferrer\">a</a></p>"
)]
#[case("[a [b] c](/u)", "<p><a href=\"/u\">a [b] c</a></p>")]
#[case("[t](/u \"Title\")", "<p><a href=\"/u\" title=\"Title\">t</a></p>")]
#[case("![alt](/i.png)", "<p><img src=\"/i.png\" alt=\"alt\"></p>")]
#[case("[**b**](/u)", "<p><a href=\"/u\"><strong>b</strong></a></p>")]
#[case("[no target]", "<p>[no target]</p>")]
fn links_and_images(#[case] md: &str, #[case] expected: &str) {
    assert_html(md, expected);
}

#[rstest]
#[case("[https://a.b](https://a.b)", 1)]
#[case("[see https://a.b/x](/local)", 1)]
#[case("[[inner](/i)](/outer)", 1)]
#[case("[a](/1) and https://b.c and [d](/2)", 3)]
fn anchors_never_nest(#[case] md: &str, #[case] anchors: usize) {
    let html = plain(md);
    assert_eq!(html.matches("<a ").count(), anchors);
    assert_eq!(html.matches("</a>").count(), anchors);
}

#[test]
fn url_as_link_text() {
    assert_html(
        "[https://a.b](https://a.b)",
        "<p><a href=\"https://a.b\" rel=\"noopener noreferrer\">https://a.b</a></p>",
    );
}

#[rstest]
#[case("[x](javascript:alert(1))")]
#[case("[x](JavaScript:alert(1))")]
#[case("[x]( vbscript:msgbox )")]
#[case("[x](data:text/html,hi)")]
#[case("[x](java\tscript:alert(1))")]
#[case("[x](java\nscript:alert(2))")]
#[case("[x](\u{1}javascript:alert(3))")]
fn unsafe_urls_are_neutralised(#[case] md: &str) {
    let html = plain(md);
    assert_eq!(html, "<p><a href=\"#\">x</a></p>");
    assert!(!html.to_ascii_lowercase().contains("javascript:"));
}

#[test]
fn data_image_urls_are_kept() {
    let html = plain("![x](data:image/png;base64,AA==)");
    assert!(html.contains("src=\"data:image/png;base64,AA==\""));
}

#[test]
fn unsafe_urls_allowed_on_request() {
    let opts = ParseOptions {
        allow_unsafe_urls: true,
        ..Default::default()
    };
    let html = render("[x](javascript:void(0))", &opts);
    assert!(html.contains("href=\"javascript:void(0)\""));
}

#[test]
fn bare_urls_become_links() {
    assert_html(
        "visit https://e.com/x.",
        "<p>visit <a href=\"https://e.com/x\" rel=\"noopener noreferrer\">https://e.com/x</a>.</p>",
    );
    assert_html("nohttp://e.com", "<p>nohttp://e.com</p>");
}

#[test]
fn escaping_is_applied_once() {
    let html = plain("a < b & c > \"d\" 'e'");
    assert_eq!(html, "<p>a &lt; b &amp; c &gt; &quot;d&quot; &#39;e&#39;</p>");
    for entity in ["&lt;", "&gt;", "&amp;"] {
        assert_eq!(html.matches(entity).count(), 1, "{entity}");
    }
    assert!(!html.contains("&amp;lt;"));
}

#[test]
fn soft_and_hard_line_breaks() {
    assert_html("a\nb", "<p>a\nb</p>");
    assert_html("a  \nb", "<p>a<br>b</p>");
    let lazy = ParseOptions {
        lazy_linefeeds: true,
        ..Default::default()
    };
    assert_eq!(render("a\nb\n\nc", &lazy), "<p>a<br>b</p><p>c</p>");
}

#[test]
fn inline_styles_replace_classes() {
    let opts = ParseOptions {
        inline_styles: true,
        ..Default::default()
    };
    assert_eq!(
        render("**b**", &opts),
        "<p><strong style=\"font-weight: bold\">b</strong></p>"
    );
    let html = render("| a |\n|:-:|", &opts);
    assert!(html.contains(
        "<th style=\"border: 1px solid #ddd; padding: 8px; background-color: #f2f2f2; \
         font-weight: bold; text-align: center\">a</th>"
    ));
    assert!(!html.contains("class="));
}

#[test]
fn custom_class_prefix() {
    let opts = ParseOptions {
        class_prefix: "md-".into(),
        ..Default::default()
    };
    assert_eq!(render("*x*", &opts), "<p><em class=\"md-em\">x</em></p>");
}

#[rstest]
#[case("# h")]
#[case("```js\na < b\n```")]
#[case("- a\n  - b\n\n| x |\n|---|\n| 1 |")]
#[case("> q **s** [l](javascript:x)")]
fn declining_fence_plugin_changes_nothing(#[case] md: &str) {
    let opts = ParseOptions {
        fence_plugin: Some(FencePlugin::infallible(|_, _| None)),
        ..Default::default()
    };
    assert_eq!(render(md, &opts), render(md, &ParseOptions::default()));
}

#[test]
fn fence_plugin_gets_raw_content() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let opts = ParseOptions {
        fence_plugin: Some(FencePlugin::infallible(move |content, lang| {
            sink.lock().unwrap().push((content.to_string(), lang.to_string()));
            Some("<div>custom</div>".to_string())
        })),
        ..Default::default()
    };
    let html = render("```html\n<b>&</b>\n```\n\n~~~\nplain\n~~~", &opts);
    assert_eq!(html, "<div>custom</div><div>custom</div>");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("<b>&</b>".to_string(), "html".to_string()),
            ("plain".to_string(), String::new()),
        ]
    );
}

#[test]
fn fence_plugin_error_propagates() {
    let opts = ParseOptions {
        fence_plugin: Some(FencePlugin::new(|_, _| Err("renderer offline".into()))),
        ..Default::default()
    };
    let err = parse("text\n\n```\nx\n```", &opts).unwrap_err();
    assert!(matches!(err, Error::FencePlugin(_)));
    assert_eq!(err.source().unwrap().to_string(), "renderer offline");
}

#[test]
#[should_panic(expected = "plugin bug")]
fn fence_plugin_panic_is_not_caught() {
    let opts = ParseOptions {
        fence_plugin: Some(FencePlugin::infallible(|_, _| panic!("plugin bug"))),
        ..Default::default()
    };
    let _ = parse("```\nx\n```", &opts);
}

#[test]
fn bidirectional_markers() {
    let opts = bidi();
    assert_eq!(
        render("## h", &opts),
        "<h2 class=\"quikdown-h2\" data-qd=\"##\">h</h2>"
    );
    assert_eq!(
        render("```js\nx\n```", &opts),
        "<pre class=\"quikdown-pre\" data-qd=\"```\" data-qd-lang=\"js\"><code class=\"language-js\">x</code></pre>"
    );
    assert_eq!(render("----", &opts), "<hr class=\"quikdown-hr\" data-qd=\"----\">");
    assert_eq!(
        render("> q", &opts),
        "<blockquote class=\"quikdown-blockquote\" data-qd=\"&gt;\">q</blockquote>"
    );
    assert!(render("2. x", &opts).contains("<li class=\"quikdown-li\" data-qd=\"2.\">x</li>"));
    assert!(render("| a |\n|---|", &opts).starts_with("<table class=\"quikdown-table\" data-qd=\"|\">"));
    assert_eq!(
        render("![i](/s) [l](/u)", &opts),
        "<p><img class=\"quikdown-img\" data-qd=\"!\" src=\"/s\" alt=\"i\"> \
         <a class=\"quikdown-a\" data-qd=\"[\" href=\"/u\">l</a></p>"
    );
}

#[test]
fn markers_absent_by_default() {
    let html = render("# h\n\n**b** - x", &ParseOptions::default());
    assert!(!html.contains("data-qd"));
}

#[test]
fn parsing_is_deterministic() {
    let md = "# t\n\n- a\n  - b\n\n| x | y |\n|--:|---|\n| 1 | 2 |\n\n**s** https://e.com `c`";
    let opts = bidi();
    assert_eq!(render(md, &opts), render(md, &opts));
}

#[test]
fn configure_binds_options() {
    let to_html = configure(ParseOptions {
        class_prefix: "x-".into(),
        ..Default::default()
    });
    assert_eq!(to_html("~~s~~").unwrap(), "<p><del class=\"x-del\">s</del></p>");
    assert_eq!(to_html("").unwrap(), "");
}

#[test]
fn byte_input() {
    assert_eq!(parse_bytes(b"# b", &ParseOptions::default()).unwrap(), "<h1 class=\"quikdown-h1\">b</h1>");
    assert_eq!(parse_bytes(&[0xc3, 0x28], &ParseOptions::default()).unwrap(), "");
}

#[test]
fn mixed_document() {
    let md = "# Title\n\nIntro with *em*.\n\n- one\n- two\n\n> note\n\n---\n\n```sh\nls\n```";
    assert_html(
        md,
        "<h1>Title</h1><p>Intro with <em>em</em>.</p><ul><li>one</li><li>two</li></ul>\
         <blockquote>note</blockquote><hr><pre><code class=\"language-sh\">ls</code></pre>",
    );
}

#[cfg(feature = "serde")]
#[test]
fn options_deserialize_with_defaults() {
    let opts: ParseOptions =
        serde_json::from_str(r#"{"inline_styles": true, "class_prefix": "x-"}"#).unwrap();
    assert!(opts.inline_styles);
    assert_eq!(opts.class_prefix, "x-");
    assert!(!opts.bidirectional);
    assert!(opts.fence_plugin.is_none());
}
