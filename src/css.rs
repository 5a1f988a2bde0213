// src/css.rs
//
// CSS display / white-space classification.
//
// Every node gets a `css_display` and a `css_whitespace` computed from its own
// variant and name, its previous sibling (for the `<!-- display: x -->`
// override) and the configured whitespace sensitivity. Nothing here looks at
// layout decisions, so the pass runs once before printing and is never
// revisited.

use log::trace;

use crate::ast::{NodeId, NodeKind, Tree};
use crate::config::WhitespaceSensitivity;
use crate::visit::{walk, Visitor};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssDisplay {
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Table,
    TableCaption,
    TableColumnGroup,
    TableColumn,
    TableHeaderGroup,
    TableRowGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    Ruby,
    RubyText,
    None,
    /// Any other keyword, as written in an override comment.
    Other(String),
}

impl CssDisplay {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "inline" => CssDisplay::Inline,
            "block" => CssDisplay::Block,
            "inline-block" => CssDisplay::InlineBlock,
            "list-item" => CssDisplay::ListItem,
            "table" => CssDisplay::Table,
            "table-caption" => CssDisplay::TableCaption,
            "table-column-group" => CssDisplay::TableColumnGroup,
            "table-column" => CssDisplay::TableColumn,
            "table-header-group" => CssDisplay::TableHeaderGroup,
            "table-row-group" => CssDisplay::TableRowGroup,
            "table-footer-group" => CssDisplay::TableFooterGroup,
            "table-row" => CssDisplay::TableRow,
            "table-cell" => CssDisplay::TableCell,
            "ruby" => CssDisplay::Ruby,
            "ruby-text" => CssDisplay::RubyText,
            "none" => CssDisplay::None,
            other => CssDisplay::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CssDisplay::Inline => "inline",
            CssDisplay::Block => "block",
            CssDisplay::InlineBlock => "inline-block",
            CssDisplay::ListItem => "list-item",
            CssDisplay::Table => "table",
            CssDisplay::TableCaption => "table-caption",
            CssDisplay::TableColumnGroup => "table-column-group",
            CssDisplay::TableColumn => "table-column",
            CssDisplay::TableHeaderGroup => "table-header-group",
            CssDisplay::TableRowGroup => "table-row-group",
            CssDisplay::TableFooterGroup => "table-footer-group",
            CssDisplay::TableRow => "table-row",
            CssDisplay::TableCell => "table-cell",
            CssDisplay::Ruby => "ruby",
            CssDisplay::RubyText => "ruby-text",
            CssDisplay::None => "none",
            CssDisplay::Other(keyword) => keyword,
        }
    }

    pub fn is_table(&self) -> bool {
        self.as_str().starts_with("table")
    }

    /// `block`, `list-item` and every `table*` value.
    pub fn is_block_like(&self) -> bool {
        matches!(self, CssDisplay::Block | CssDisplay::ListItem) || self.is_table()
    }

    pub fn is_first_child_leading_space_sensitive(&self) -> bool {
        !self.is_block_like() && *self != CssDisplay::InlineBlock
    }

    pub fn is_last_child_trailing_space_sensitive(&self) -> bool {
        !self.is_block_like() && *self != CssDisplay::InlineBlock
    }

    pub fn is_prev_trailing_space_sensitive(&self) -> bool {
        !self.is_block_like()
    }

    pub fn is_next_leading_space_sensitive(&self) -> bool {
        !self.is_block_like()
    }

    pub fn is_dangling_space_sensitive(&self) -> bool {
        !self.is_block_like() && *self != CssDisplay::InlineBlock
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssWhitespace {
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
}

impl CssWhitespace {
    /// Whitespace inside is significant and must be kept as written.
    pub fn is_pre_like(self) -> bool {
        matches!(
            self,
            CssWhitespace::Pre | CssWhitespace::PreWrap | CssWhitespace::PreLine
        )
    }
}

/* ================================ Tables ================================= */

const DISPLAY_DEFAULT: CssDisplay = CssDisplay::Inline;
const LIQUID_DISPLAY_DEFAULT: CssDisplay = CssDisplay::Inline;
const WHITESPACE_DEFAULT: CssWhitespace = CssWhitespace::Normal;

static DISPLAY_TAGS: &[(&str, CssDisplay)] = &[
    // Document structure and metadata.
    ("html", CssDisplay::Block),
    ("head", CssDisplay::Block),
    ("body", CssDisplay::Block),
    ("title", CssDisplay::Block),
    ("meta", CssDisplay::Block),
    ("link", CssDisplay::Block),
    ("base", CssDisplay::Block),
    ("style", CssDisplay::None),
    ("script", CssDisplay::Block),
    ("noscript", CssDisplay::Block),
    ("template", CssDisplay::Inline),
    ("!doctype", CssDisplay::Block),
    // Sectioning and grouping content.
    ("address", CssDisplay::Block),
    ("article", CssDisplay::Block),
    ("aside", CssDisplay::Block),
    ("blockquote", CssDisplay::Block),
    ("center", CssDisplay::Block),
    ("dd", CssDisplay::Block),
    ("details", CssDisplay::Block),
    ("dialog", CssDisplay::Block),
    ("dir", CssDisplay::Block),
    ("div", CssDisplay::Block),
    ("dl", CssDisplay::Block),
    ("dt", CssDisplay::Block),
    ("fieldset", CssDisplay::Block),
    ("figcaption", CssDisplay::Block),
    ("figure", CssDisplay::Block),
    ("footer", CssDisplay::Block),
    ("form", CssDisplay::Block),
    ("h1", CssDisplay::Block),
    ("h2", CssDisplay::Block),
    ("h3", CssDisplay::Block),
    ("h4", CssDisplay::Block),
    ("h5", CssDisplay::Block),
    ("h6", CssDisplay::Block),
    ("header", CssDisplay::Block),
    ("hgroup", CssDisplay::Block),
    ("hr", CssDisplay::Block),
    ("legend", CssDisplay::Block),
    ("listing", CssDisplay::Block),
    ("main", CssDisplay::Block),
    ("menu", CssDisplay::Block),
    ("nav", CssDisplay::Block),
    ("ol", CssDisplay::Block),
    ("optgroup", CssDisplay::Block),
    ("option", CssDisplay::Block),
    ("p", CssDisplay::Block),
    ("param", CssDisplay::Block),
    ("plaintext", CssDisplay::Block),
    ("pre", CssDisplay::Block),
    ("search", CssDisplay::Block),
    ("section", CssDisplay::Block),
    ("source", CssDisplay::Block),
    ("summary", CssDisplay::Block),
    ("track", CssDisplay::Block),
    ("ul", CssDisplay::Block),
    ("xmp", CssDisplay::Block),
    ("li", CssDisplay::ListItem),
    // Tables.
    ("table", CssDisplay::Table),
    ("caption", CssDisplay::TableCaption),
    ("colgroup", CssDisplay::TableColumnGroup),
    ("col", CssDisplay::TableColumn),
    ("thead", CssDisplay::TableHeaderGroup),
    ("tbody", CssDisplay::TableRowGroup),
    ("tfoot", CssDisplay::TableFooterGroup),
    ("tr", CssDisplay::TableRow),
    ("td", CssDisplay::TableCell),
    ("th", CssDisplay::TableCell),
    // Replaced and form controls.
    ("audio", CssDisplay::InlineBlock),
    ("button", CssDisplay::InlineBlock),
    ("marquee", CssDisplay::InlineBlock),
    ("meter", CssDisplay::InlineBlock),
    ("object", CssDisplay::InlineBlock),
    ("progress", CssDisplay::InlineBlock),
    ("select", CssDisplay::InlineBlock),
    ("video", CssDisplay::InlineBlock),
    // Ruby.
    ("ruby", CssDisplay::Ruby),
    ("rt", CssDisplay::RubyText),
    ("rp", CssDisplay::None),
];

static LIQUID_DISPLAY_TAGS: &[(&str, CssDisplay)] = &[
    ("if", CssDisplay::Block),
    ("unless", CssDisplay::Block),
    ("case", CssDisplay::Block),
    ("for", CssDisplay::Block),
    ("tablerow", CssDisplay::Block),
    ("capture", CssDisplay::Block),
    ("form", CssDisplay::Block),
    ("paginate", CssDisplay::Block),
    ("comment", CssDisplay::Block),
    ("raw", CssDisplay::Block),
    ("javascript", CssDisplay::Block),
    ("schema", CssDisplay::Block),
    ("style", CssDisplay::Block),
    ("stylesheet", CssDisplay::Block),
    ("liquid", CssDisplay::Block),
    ("layout", CssDisplay::Block),
    ("section", CssDisplay::Block),
    ("sections", CssDisplay::Block),
];

static WHITESPACE_TAGS: &[(&str, CssWhitespace)] = &[
    ("listing", CssWhitespace::Pre),
    ("nobr", CssWhitespace::Nowrap),
    ("plaintext", CssWhitespace::PreWrap),
    ("pre", CssWhitespace::Pre),
    ("textarea", CssWhitespace::PreWrap),
    ("xmp", CssWhitespace::Pre),
];

fn lookup<T: Clone>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(tag, _)| name.eq_ignore_ascii_case(tag))
        .map(|(_, value)| value.clone())
}

pub fn display_for_tag(name: &str) -> CssDisplay {
    lookup(DISPLAY_TAGS, name).unwrap_or(DISPLAY_DEFAULT)
}

pub fn display_for_liquid_tag(name: &str) -> CssDisplay {
    lookup(LIQUID_DISPLAY_TAGS, name).unwrap_or(LIQUID_DISPLAY_DEFAULT)
}

pub fn whitespace_for_tag(name: &str) -> CssWhitespace {
    lookup(WHITESPACE_TAGS, name).unwrap_or(WHITESPACE_DEFAULT)
}

/* =========================== Override comment ============================ */

/// Matches a comment body of the form `display: <word>` where `<word>` is
/// lowercase ASCII letters, with optional blank space around the parts.
fn display_override(body: &str) -> Option<&str> {
    let rest = body.trim_start().strip_prefix("display:")?;
    let rest = rest.trim_start();
    let word_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_lowercase())
        .count();
    if word_len == 0 || !rest[word_len..].trim().is_empty() {
        return None;
    }
    Some(&rest[..word_len])
}

/* ============================== Classifier =============================== */

fn by_sensitivity(mode: WhitespaceSensitivity, table: impl FnOnce() -> CssDisplay) -> CssDisplay {
    match mode {
        WhitespaceSensitivity::Strict => CssDisplay::Inline,
        WhitespaceSensitivity::Ignore => CssDisplay::Block,
        WhitespaceSensitivity::Css => table(),
    }
}

pub fn css_display(tree: &Tree, id: NodeId, mode: WhitespaceSensitivity) -> CssDisplay {
    let node = tree.node(id);

    if let Some(prev) = node.prev.map(|prev| tree.node(prev)) {
        if prev.kind == NodeKind::HtmlComment {
            if let Some(keyword) = display_override(&prev.value) {
                trace!(target: "reformaliquid::css", "display override {keyword:?} for node at {}", node.start);
                return CssDisplay::from_keyword(keyword);
            }
        }
    }

    match node.kind {
        NodeKind::HtmlElement
        | NodeKind::HtmlVoidElement
        | NodeKind::HtmlSelfClosingElement
        | NodeKind::HtmlRawNode => by_sensitivity(mode, || display_for_tag(node.name())),

        NodeKind::TextNode => CssDisplay::Inline,

        NodeKind::LiquidTag | NodeKind::LiquidRawTag => {
            by_sensitivity(mode, || display_for_liquid_tag(node.name()))
        }

        NodeKind::LiquidBranch | NodeKind::LiquidDrop => CssDisplay::Inline,

        NodeKind::AttrDoubleQuoted
        | NodeKind::AttrSingleQuoted
        | NodeKind::AttrUnquoted
        | NodeKind::AttrEmpty => CssDisplay::Inline,

        NodeKind::HtmlComment => CssDisplay::Block,

        NodeKind::Document => CssDisplay::Block,
    }
}

pub fn css_whitespace(tree: &Tree, id: NodeId) -> CssWhitespace {
    let node = tree.node(id);
    match node.kind {
        NodeKind::HtmlElement
        | NodeKind::HtmlVoidElement
        | NodeKind::HtmlSelfClosingElement
        | NodeKind::HtmlRawNode => whitespace_for_tag(node.name()),

        NodeKind::LiquidRawTag => CssWhitespace::Pre,

        NodeKind::TextNode
        | NodeKind::LiquidTag
        | NodeKind::LiquidBranch
        | NodeKind::LiquidDrop
        | NodeKind::AttrDoubleQuoted
        | NodeKind::AttrSingleQuoted
        | NodeKind::AttrUnquoted
        | NodeKind::AttrEmpty
        | NodeKind::HtmlComment
        | NodeKind::Document => WHITESPACE_DEFAULT,
    }
}

/// Collects every node's classification in document order.
struct Classifier {
    mode: WhitespaceSensitivity,
    styles: Vec<(NodeId, CssDisplay, CssWhitespace)>,
}

impl Visitor for Classifier {
    fn enter(&mut self, tree: &Tree, id: NodeId) {
        self.styles
            .push((id, css_display(tree, id, self.mode), css_whitespace(tree, id)));
    }
}

/// Writes `css_display` / `css_whitespace` on every node, exactly once.
pub fn classify_tree(tree: &mut Tree, mode: WhitespaceSensitivity) {
    let mut classifier = Classifier {
        mode,
        styles: Vec::with_capacity(tree.len()),
    };
    walk(tree, &mut classifier);
    for (id, display, whitespace) in classifier.styles {
        let node = tree.node_mut(id);
        node.css_display = display;
        node.css_whitespace = whitespace;
    }
}
