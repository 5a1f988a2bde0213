// tests/format.rs

use reformaliquid::{format, FormatError, FormatOptions, WhitespaceSensitivity};

fn fmt_with(source: &str, print_width: usize, whitespace_sensitivity: WhitespaceSensitivity) -> String {
    let options = FormatOptions {
        print_width,
        whitespace_sensitivity,
        ..FormatOptions::default()
    };
    format(source, &options).unwrap()
}

fn fmt(source: &str, print_width: usize) -> String {
    fmt_with(source, print_width, WhitespaceSensitivity::Css)
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<title>{{ page.title }}</title>
</head>
<body>
<ul>
{% for item in items %}
<li class="item">{{ item.name }}</li>
{% endfor %}
</ul>


<p>Hello <b>world</b>, welcome.</p>
</body>
</html>
"#;

#[test]
fn adjacent_text_without_whitespace_stays_joined() {
    assert_eq!(fmt("a{{ b }}", 80), "a{{ b }}\n");
    assert_eq!(fmt("a{{ b }}", 1), "a{{ b }}\n");
}

#[test]
fn adjacent_text_with_whitespace_is_a_line() {
    assert_eq!(fmt("a   {{ b }}", 80), "a {{ b }}\n");
    assert_eq!(fmt("a   {{ b }}", 5), "a\n{{ b }}\n");
}

#[test]
fn self_closing_element_lends_its_closing_marker() {
    assert_eq!(fmt("<x-icon/>text", 80), "<x-icon />text\n");
    assert_eq!(fmt("<x-icon/>text", 4), "<x-icon />text\n");
}

#[test]
fn override_comment_makes_a_block_element_inline() {
    let source = "<!-- display: inline -->\n<div>aaaa bbbb</div>";
    let inline = "<!-- display: inline -->\n<div\n  >aaaa\n  bbbb</div\n>\n";
    for mode in [
        WhitespaceSensitivity::Css,
        WhitespaceSensitivity::Strict,
        WhitespaceSensitivity::Ignore,
    ] {
        assert_eq!(fmt_with(source, 10, mode), inline, "{mode:?}");
    }
    assert_eq!(
        fmt("<div>aaaa bbbb</div>", 10),
        "<div>\n  aaaa\n  bbbb\n</div>\n"
    );
}

#[test]
fn representative_page() {
    assert_eq!(
        fmt(PAGE, 80),
        r#"<!doctype html>
<html>
  <head>
    <title>{{ page.title }}</title>
  </head>
  <body>
    <ul>
      {% for item in items %}
        <li class="item">{{ item.name }}</li>
      {% endfor %}
    </ul>

    <p>Hello <b>world</b>, welcome.</p>
  </body>
</html>
"#
    );
}

#[test]
fn formatting_is_idempotent() {
    for width in [40, 80] {
        let once = fmt(PAGE, width);
        assert_eq!(fmt(&once, width), once, "width {width}");
    }
}

#[test]
fn ignored_region_is_copied_exactly() {
    assert_eq!(
        fmt("<div><!-- prettier-ignore --><span   a=\"1\" >  x  </span></div>", 80),
        "<div>\n  <!-- prettier-ignore -->\n  <span   a=\"1\" >  x  </span>\n</div>\n"
    );
}

#[test]
fn significant_whitespace_survives_narrow_widths() {
    let out = fmt("<p><b>one</b> <i>two</i></p>", 8);
    assert!(!out.contains("</b><i"), "{out}");
    let out = fmt("<p><b>one</b><i>two</i></p>", 8);
    assert!(!out.contains("</b> <i"), "{out}");
    assert!(!out.contains("</b>\n"), "{out}");
}

#[test]
fn empty_input_formats_to_nothing() {
    assert_eq!(fmt("", 80), "");
    assert_eq!(fmt("  \n ", 80), "");
}

#[test]
fn malformed_input_is_an_error() {
    let err = format("<div><span></div>", &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::Parse { .. }), "{err:?}");
    let err = format("{% if a %}x", &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::Parse { .. }), "{err:?}");
}

#[test]
fn tabs_and_indent_width() {
    let options = FormatOptions {
        use_tabs: true,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("<ul><li>a</li></ul>", &options).unwrap(),
        "<ul>\n\t<li>a</li>\n</ul>\n"
    );
    let options = FormatOptions {
        indent_width: 4,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("<ul><li>a</li></ul>", &options).unwrap(),
        "<ul>\n    <li>a</li>\n</ul>\n"
    );
}
