// src/facts.rs
//
// Per-node facts consumed by the printer: text-likeness, marker borrowing,
// hard-break preferences, forced multi-line layout and ignore markers.
//
// Every query has a default implementation over the tree, so a provider only
// has to hand out its `Tree`. Tests pin individual facts by overriding the
// matching method.

use crate::ast::{Node, NodeId, NodeKind, Tree};
use crate::css::CssDisplay;

const FORCE_BREAK_CHILDREN: &[&str] = &["html", "head", "ul", "ol", "select"];
const FORCE_BREAK_CONTENT: &[&str] = &["body", "script", "style"];
const IGNORE_DIRECTIVE: &str = "prettier-ignore";

fn named(node: &Node, names: &[&str]) -> bool {
    names.iter().any(|name| node.name().eq_ignore_ascii_case(name))
}

pub trait NodeFacts {
    fn tree(&self) -> &Tree;

    fn node(&self, id: NodeId) -> &Node {
        self.tree().node(id)
    }

    /// Text, comments and drops: content that flows with words.
    fn is_text_like(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::TextNode | NodeKind::HtmlComment | NodeKind::LiquidDrop
        )
    }

    fn is_self_closing(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::HtmlVoidElement | NodeKind::HtmlSelfClosingElement
        )
    }

    fn is_pre_like(&self, id: NodeId) -> bool {
        self.node(id).css_whitespace.is_pre_like()
    }

    /* --------------------------- Marker borrowing --------------------------- */

    /// `text<b` : text prints the `<b` of the tag that follows it.
    fn requires_borrowing_next_opening_marker(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let Some(next) = node.next else {
            return false;
        };
        !self.is_text_like(next)
            && self.is_text_like(id)
            && node.is_trailing_whitespace_sensitive
            && !node.has_trailing_whitespace
    }

    /// `>text` : the node prints the `>` of the tag before it.
    fn requires_borrowing_prev_closing_marker(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let Some(prev) = node.prev else {
            return false;
        };
        !self.is_text_like(prev)
            && node.is_leading_whitespace_sensitive
            && !node.has_leading_whitespace
    }

    /// `text</p` : the last child prints the start of its parent's closing tag.
    fn requires_borrowing_parent_closing_start_marker(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return false;
        };
        self.node(parent).kind == NodeKind::HtmlElement
            && node.next.is_none()
            && !node.has_trailing_whitespace
            && node.is_trailing_whitespace_sensitive
            && self.is_text_like(self.tree().last_descendant(id))
    }

    /// `<p>text` : the first child prints the end of its parent's opening tag.
    fn requires_borrowing_parent_opening_end_marker(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return false;
        };
        self.node(parent).kind == NodeKind::HtmlElement
            && node.prev.is_none()
            && node.is_leading_whitespace_sensitive
            && !node.has_leading_whitespace
    }

    /// `</b></p>` : the element prints the `>` of its last child's closing tag.
    fn requires_borrowing_last_child_closing_end_marker(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if node.kind != NodeKind::HtmlElement {
            return false;
        }
        let Some(last) = node.last_child() else {
            return false;
        };
        let last_node = self.node(last);
        last_node.is_trailing_whitespace_sensitive
            && !last_node.has_trailing_whitespace
            && last_node.kind.is_element_like()
            && !self.is_text_like(self.tree().last_descendant(last))
            && !self.is_pre_like(id)
    }

    /* ------------------------------ Line breaks ----------------------------- */

    fn prefers_hard_surrounding_breaks(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.kind {
            NodeKind::HtmlComment | NodeKind::LiquidRawTag => true,
            NodeKind::HtmlElement | NodeKind::HtmlRawNode => named(node, &["script", "select"]),
            NodeKind::LiquidTag => !node.children.is_empty(),
            _ => false,
        }
    }

    fn prefers_hard_leading_break(&self, id: NodeId) -> bool {
        self.prefers_hard_surrounding_breaks(id)
            || self
                .node(id)
                .prev
                .is_some_and(|prev| self.prefers_hard_trailing_break(prev))
            || self.has_surrounding_line_breaks(id)
    }

    fn prefers_hard_trailing_break(&self, id: NodeId) -> bool {
        let node = self.node(id);
        self.prefers_hard_surrounding_breaks(id)
            || (node.kind.is_element_like() && node.name().eq_ignore_ascii_case("br"))
            || self.has_surrounding_line_breaks(id)
    }

    /// Whitespace before the node in the source held a newline.
    fn has_leading_line_break(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !node.has_leading_whitespace {
            return false;
        }
        if let Some(prev) = node.prev {
            return self.tree().newline_count(self.node(prev).end..node.start) > 0;
        }
        match node.parent.map(|parent| self.node(parent)) {
            Some(parent) if parent.kind == NodeKind::Document => true,
            Some(parent) => {
                let from = parent.body.as_ref().map_or(parent.start, |body| body.start);
                self.tree().newline_count(from..node.start) > 0
            }
            None => false,
        }
    }

    /// Whitespace after the node in the source held a newline.
    fn has_trailing_line_break(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !node.has_trailing_whitespace {
            return false;
        }
        if let Some(next) = node.next {
            return self.tree().newline_count(node.end..self.node(next).start) > 0;
        }
        match node.parent.map(|parent| self.node(parent)) {
            Some(parent) if parent.kind == NodeKind::Document => true,
            Some(parent) => {
                let to = parent.body.as_ref().map_or(parent.end, |body| body.end);
                self.tree().newline_count(node.end..to) > 0
            }
            None => false,
        }
    }

    fn has_surrounding_line_breaks(&self, id: NodeId) -> bool {
        self.has_leading_line_break(id) && self.has_trailing_line_break(id)
    }

    /* ------------------------------ Layout mode ----------------------------- */

    /// One child per line, always.
    fn must_force_multiline_children(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.kind == NodeKind::HtmlElement
            && !node.children.is_empty()
            && (named(node, FORCE_BREAK_CHILDREN)
                || (node.css_display.is_table() && node.css_display != CssDisplay::TableCell))
    }

    /// The element's content goes on its own lines, children may still share one.
    fn must_force_break_content(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if self.must_force_multiline_children(id) {
            return true;
        }
        if node.kind == NodeKind::HtmlElement
            && !node.children.is_empty()
            && (named(node, FORCE_BREAK_CONTENT)
                || node.children.iter().any(|&child| {
                    self.node(child)
                        .children
                        .iter()
                        .any(|&grandchild| self.node(grandchild).kind != NodeKind::TextNode)
                }))
        {
            return true;
        }
        match (node.first_child(), node.last_child()) {
            (Some(first), Some(last)) if first == last => {
                let child = self.node(first);
                child.kind != NodeKind::TextNode
                    && self.has_leading_line_break(first)
                    && (!child.is_trailing_whitespace_sensitive || self.has_trailing_line_break(first))
            }
            _ => false,
        }
    }

    /// The source holds a blank line between the node and its next sibling.
    fn should_preserve_blank_line_after(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.next {
            Some(next) => self.tree().newline_count(node.end..self.node(next).start) >= 2,
            None => false,
        }
    }

    /// Preceded by `<!-- prettier-ignore -->` or `{% # prettier-ignore %}`.
    fn is_ignored(&self, id: NodeId) -> bool {
        let Some(prev) = self.node(id).prev.map(|prev| self.node(prev)) else {
            return false;
        };
        match prev.kind {
            NodeKind::HtmlComment => prev.value.trim() == IGNORE_DIRECTIVE,
            NodeKind::LiquidTag => prev.name() == "#" && prev.value == IGNORE_DIRECTIVE,
            _ => false,
        }
    }
}

/// Facts derived from the parsed tree alone.
pub struct SourceFacts<'t> {
    tree: &'t Tree,
}

impl<'t> SourceFacts<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        SourceFacts { tree }
    }
}

impl NodeFacts for SourceFacts<'_> {
    fn tree(&self) -> &Tree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitespaceSensitivity;
    use crate::css::classify_tree;
    use crate::parse::parse;
    use crate::whitespace::compute_sensitivity;

    fn prepared(source: &str) -> Tree {
        let mut tree = parse(source).unwrap();
        classify_tree(&mut tree, WhitespaceSensitivity::Css);
        compute_sensitivity(&mut tree);
        tree
    }

    fn child(tree: &Tree, parent: NodeId, index: usize) -> NodeId {
        tree.node(parent).children[index]
    }

    #[test]
    fn text_borrows_markers_of_adjacent_inline_elements() {
        let tree = prepared("<p>a<b>b</b>c</p>");
        let facts = SourceFacts::new(&tree);
        let p = child(&tree, NodeId::DOCUMENT, 0);
        let (a, b, c) = (child(&tree, p, 0), child(&tree, p, 1), child(&tree, p, 2));

        assert!(facts.requires_borrowing_next_opening_marker(a));
        assert!(facts.requires_borrowing_prev_closing_marker(c));
        assert!(!facts.requires_borrowing_prev_closing_marker(b));
        // `<p>` is block, so its first and last child do not touch its tags.
        assert!(!facts.requires_borrowing_parent_opening_end_marker(a));
        assert!(!facts.requires_borrowing_parent_closing_start_marker(c));
        assert!(facts.requires_borrowing_parent_closing_start_marker(child(&tree, b, 0)));
    }

    #[test]
    fn whitespace_cancels_borrowing() {
        let tree = prepared("<span>a <b>b</b> c</span>");
        let facts = SourceFacts::new(&tree);
        let span = child(&tree, NodeId::DOCUMENT, 0);

        assert!(!facts.requires_borrowing_next_opening_marker(child(&tree, span, 0)));
        assert!(!facts.requires_borrowing_prev_closing_marker(child(&tree, span, 2)));
    }

    #[test]
    fn element_borrows_its_last_child_closing_marker() {
        let tree = prepared("<span><i>x</i><b><img></b></span>");
        let facts = SourceFacts::new(&tree);
        let span = child(&tree, NodeId::DOCUMENT, 0);
        let b = child(&tree, span, 1);

        assert!(facts.requires_borrowing_last_child_closing_end_marker(b));
        assert!(!facts.requires_borrowing_last_child_closing_end_marker(child(&tree, span, 0)));
    }

    #[test]
    fn hard_break_preferences() {
        let tree = prepared("<div>a<br>b<!-- c -->{% if x %}y{% endif %}</div>");
        let facts = SourceFacts::new(&tree);
        let div = child(&tree, NodeId::DOCUMENT, 0);

        assert!(facts.prefers_hard_trailing_break(child(&tree, div, 1)));
        assert!(facts.prefers_hard_leading_break(child(&tree, div, 2)));
        assert!(facts.prefers_hard_leading_break(child(&tree, div, 3)));
        assert!(facts.prefers_hard_leading_break(child(&tree, div, 4)));
        assert!(!facts.prefers_hard_leading_break(child(&tree, div, 0)));
    }

    #[test]
    fn surrounding_line_breaks_prefer_hard_breaks() {
        let tree = prepared("<span>a\n<b>x</b>\nc d</span>");
        let facts = SourceFacts::new(&tree);
        let span = child(&tree, NodeId::DOCUMENT, 0);
        let b = child(&tree, span, 1);

        assert!(facts.has_leading_line_break(b));
        assert!(facts.has_trailing_line_break(b));
        assert!(facts.prefers_hard_leading_break(b));
        assert!(!facts.has_leading_line_break(child(&tree, span, 0)));
    }

    #[test]
    fn forced_layouts() {
        let tree = prepared("<ul><li>a</li></ul><table><tr><td>x</td></tr></table><p>t</p><body><p>a</p></body>");
        let facts = SourceFacts::new(&tree);
        let doc = tree.node(NodeId::DOCUMENT).children.clone();
        let table = doc[1];
        let tr = child(&tree, table, 0);
        let td = child(&tree, tr, 0);

        assert!(facts.must_force_multiline_children(doc[0]));
        assert!(facts.must_force_multiline_children(table));
        assert!(facts.must_force_multiline_children(tr));
        assert!(!facts.must_force_multiline_children(td));
        assert!(!facts.must_force_multiline_children(doc[2]));
        assert!(!facts.must_force_multiline_children(NodeId::DOCUMENT));
        assert!(facts.must_force_break_content(doc[3]));
        assert!(!facts.must_force_break_content(doc[2]));
    }

    #[test]
    fn blank_lines_between_siblings() {
        let tree = prepared("<p>a</p>\n\n<p>b</p>\n<p>c</p>");
        let facts = SourceFacts::new(&tree);
        let doc = tree.node(NodeId::DOCUMENT).children.clone();

        assert!(facts.should_preserve_blank_line_after(doc[0]));
        assert!(!facts.should_preserve_blank_line_after(doc[1]));
        assert!(!facts.should_preserve_blank_line_after(doc[2]));
    }

    #[test]
    fn ignore_directives() {
        let tree = prepared("<!-- prettier-ignore --><p>a</p>{% # prettier-ignore %}<p>b</p><p>c</p>");
        let facts = SourceFacts::new(&tree);
        let doc = tree.node(NodeId::DOCUMENT).children.clone();

        assert!(facts.is_ignored(doc[1]));
        assert!(facts.is_ignored(doc[3]));
        assert!(!facts.is_ignored(doc[4]));
    }

    struct Pinned<'t> {
        inner: SourceFacts<'t>,
        ignored: NodeId,
    }

    impl NodeFacts for Pinned<'_> {
        fn tree(&self) -> &Tree {
            self.inner.tree()
        }

        fn is_ignored(&self, id: NodeId) -> bool {
            id == self.ignored
        }
    }

    #[test]
    fn providers_override_single_facts() {
        let tree = prepared("<p>a</p><p>b</p>");
        let second = child(&tree, NodeId::DOCUMENT, 1);
        let facts = Pinned {
            inner: SourceFacts::new(&tree),
            ignored: second,
        };

        assert!(facts.is_ignored(second));
        assert!(facts.is_text_like(child(&tree, second, 0)));
    }
}
