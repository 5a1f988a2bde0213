// src/ast.rs
//
// Arena-backed syntax tree. Nodes own their children through index lists;
// parent/prev/next are plain `NodeId`s into the same arena and never keep
// anything alive. The tree is built once by the parser, augmented in place
// by the classification passes, and read-only afterwards.

use std::fmt;
use std::ops::Range;

use memchr::memchr_iter;

use crate::css::{CssDisplay, CssWhitespace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The document node is always the first one allocated.
    pub const DOCUMENT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    HtmlElement,
    HtmlVoidElement,
    HtmlSelfClosingElement,
    HtmlRawNode,
    HtmlComment,
    TextNode,
    LiquidTag,
    LiquidRawTag,
    LiquidBranch,
    LiquidDrop,
    AttrDoubleQuoted,
    AttrSingleQuoted,
    AttrUnquoted,
    AttrEmpty,
}

impl NodeKind {
    /// Variants that own an ordered list of children.
    pub fn has_children(self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::HtmlElement | NodeKind::LiquidTag | NodeKind::LiquidBranch
        )
    }

    /// Variants printed with `<name ...>` tags whose boundary markers can be borrowed.
    pub fn is_element_like(self) -> bool {
        matches!(
            self,
            NodeKind::HtmlElement
                | NodeKind::HtmlVoidElement
                | NodeKind::HtmlSelfClosingElement
                | NodeKind::HtmlRawNode
        )
    }

    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            NodeKind::AttrDoubleQuoted
                | NodeKind::AttrSingleQuoted
                | NodeKind::AttrUnquoted
                | NodeKind::AttrEmpty
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::HtmlElement => "HtmlElement",
            NodeKind::HtmlVoidElement => "HtmlVoidElement",
            NodeKind::HtmlSelfClosingElement => "HtmlSelfClosingElement",
            NodeKind::HtmlRawNode => "HtmlRawNode",
            NodeKind::HtmlComment => "HtmlComment",
            NodeKind::TextNode => "TextNode",
            NodeKind::LiquidTag => "LiquidTag",
            NodeKind::LiquidRawTag => "LiquidRawTag",
            NodeKind::LiquidBranch => "LiquidBranch",
            NodeKind::LiquidDrop => "LiquidDrop",
            NodeKind::AttrDoubleQuoted => "AttrDoubleQuoted",
            NodeKind::AttrSingleQuoted => "AttrSingleQuoted",
            NodeKind::AttrUnquoted => "AttrUnquoted",
            NodeKind::AttrEmpty => "AttrEmpty",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Liquid whitespace-control dashes: `{%-` / `{{-` and `-%}` / `-}}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Strip {
    pub left: bool,
    pub right: bool,
}

impl Strip {
    pub fn open(self) -> &'static str {
        if self.left {
            "-"
        } else {
            ""
        }
    }

    pub fn close(self) -> &'static str {
        if self.right {
            "-"
        } else {
            ""
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Tag name for elements and Liquid tags/branches, attribute name for attributes.
    pub name: Option<String>,
    /// Text content, comment body, Liquid markup or attribute value, depending on `kind`.
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// Source range between the opening and the closing tag.
    pub body: Option<Range<usize>>,
    pub children: Vec<NodeId>,
    pub attributes: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub strip: Strip,
    /// Whitespace control of the matching `{% end... %}` tag.
    pub close_strip: Strip,
    pub has_leading_whitespace: bool,
    pub has_trailing_whitespace: bool,
    /// Whitespace-only content of an element without children.
    pub has_dangling_whitespace: bool,
    pub is_leading_whitespace_sensitive: bool,
    pub is_trailing_whitespace_sensitive: bool,
    pub css_display: CssDisplay,
    pub css_whitespace: CssWhitespace,
}

impl Node {
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Node {
            kind,
            name: None,
            value: String::new(),
            start,
            end,
            body: None,
            children: Vec::new(),
            attributes: Vec::new(),
            parent: None,
            prev: None,
            next: None,
            strip: Strip::default(),
            close_strip: Strip::default(),
            has_leading_whitespace: false,
            has_trailing_whitespace: false,
            has_dangling_whitespace: false,
            is_leading_whitespace_sensitive: false,
            is_trailing_whitespace_sensitive: false,
            css_display: CssDisplay::Inline,
            css_whitespace: CssWhitespace::Normal,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_body(mut self, body: Range<usize>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }
}

#[derive(Clone, Debug)]
pub struct Tree {
    source: String,
    nodes: Vec<Node>,
}

impl Tree {
    /// A tree holding only the document node spanning all of `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let len = source.len();
        let document = Node::new(NodeKind::Document, 0, len)
            .with_body(0..len)
            .with_value("");
        Tree {
            source,
            nodes: vec![document],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text for `range`, empty when the range is not on char boundaries.
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Appends `node` as the last child of `parent`, wiring sibling links.
    pub fn append_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let prev = self.node(parent).last_child();
        node.parent = Some(parent);
        node.prev = prev;
        node.next = None;
        let id = self.alloc(node);
        if let Some(prev) = prev {
            self.node_mut(prev).next = Some(id);
        }
        self.node_mut(parent).children.push(id);
        id
    }

    /// Appends an attribute node to `element`. Attributes are linked among
    /// themselves and never appear in `children`.
    pub fn append_attribute(&mut self, element: NodeId, mut node: Node) -> NodeId {
        let prev = self.node(element).attributes.last().copied();
        node.parent = Some(element);
        node.prev = prev;
        let id = self.alloc(node);
        if let Some(prev) = prev {
            self.node_mut(prev).next = Some(id);
        }
        self.node_mut(element).attributes.push(id);
        id
    }

    pub fn last_descendant(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(last) = self.node(current).last_child() {
            current = last;
        }
        current
    }

    pub fn newline_count(&self, range: Range<usize>) -> usize {
        match self.source.as_bytes().get(range) {
            Some(bytes) => memchr_iter(b'\n', bytes).count(),
            None => 0,
        }
    }
}
