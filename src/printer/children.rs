// src/printer/children.rs
//
// Sibling breaks and children layout.
//
// Between two siblings the printer may put nothing (NONE), a break that
// disappears when the line fits (SOFT), a break that becomes one space when
// the line fits (LINE), or a newline (HARD). NONE is chosen whenever even a
// line break would end up as literal text, typically right after a borrowed
// tag marker.
//
// Children are laid out one of two ways:
// - forced: one child per line, the enclosing group always breaks;
// - grouped: every non-text child sits in its own identified group, and its
//   leading break looks at whether the previous child's group broke, so two
//   neighbours never both drop the space between them.

use log::trace;

use crate::ast::{NodeId, NodeKind};
use crate::doc::{
    concat, group, group_with_id, hardline, if_break, line, nil, softline, Doc,
};
use crate::error::FormatError;
use crate::facts::NodeFacts;

use super::Printer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Break {
    None,
    Soft,
    Line,
    Hard,
}

impl Break {
    fn doc(self) -> Doc {
        match self {
            Break::None => nil(),
            Break::Soft => softline(),
            Break::Line => line(),
            Break::Hard => hardline(),
        }
    }
}

/// The break printed between two adjacent siblings.
pub fn break_between<F: NodeFacts + ?Sized>(facts: &F, prev: NodeId, next: NodeId) -> Break {
    let prev_node = facts.node(prev);
    let next_node = facts.node(next);

    if facts.is_text_like(prev) && facts.is_text_like(next) {
        return if prev_node.is_trailing_whitespace_sensitive {
            if !prev_node.has_trailing_whitespace {
                Break::None
            } else if facts.prefers_hard_leading_break(next) {
                Break::Hard
            } else {
                Break::Line
            }
        } else if facts.prefers_hard_leading_break(next) {
            Break::Hard
        } else {
            Break::Soft
        };
    }

    //     123<a          123<!--        123<span
    //          ~            ~               ~
    //       ><b>         -->              attr
    let opening_collision = facts.requires_borrowing_next_opening_marker(prev)
        && (facts.is_ignored(next)
            || !next_node.children.is_empty()
            || facts.is_self_closing(next)
            || (next_node.kind == NodeKind::HtmlElement
                && !next_node.attributes.is_empty()));

    //     <img
    //       src="long"
    //                 ~
    //     />123
    let closing_collision =
        facts.is_self_closing(prev) && facts.requires_borrowing_prev_closing_marker(next);

    if opening_collision || closing_collision {
        return Break::None;
    }

    //     Want to write us a letter? Use our<a
    //       ><b><a>mailing address</a></b></a
    //                                        ~
    //     >.
    let nested_borrow = facts.requires_borrowing_prev_closing_marker(next)
        && prev_node.last_child().is_some_and(|child| {
            facts.requires_borrowing_parent_closing_start_marker(child)
                && facts
                    .node(child)
                    .last_child()
                    .is_some_and(|grandchild| facts.requires_borrowing_parent_closing_start_marker(grandchild))
        });

    if !next_node.is_leading_whitespace_sensitive
        || facts.prefers_hard_leading_break(next)
        || nested_borrow
    {
        Break::Hard
    } else if next_node.has_leading_whitespace {
        Break::Line
    } else {
        Break::Soft
    }
}

impl Printer<'_> {
    fn break_between(&self, prev: NodeId, next: NodeId) -> Break {
        let decision = break_between(self.facts, prev, next);
        trace!(
            target: "reformaliquid::printer",
            "{:?} between {} at {} and {} at {}",
            decision,
            self.node(prev).kind,
            self.node(prev).start,
            self.node(next).kind,
            self.node(next).start,
        );
        decision
    }

    pub(super) fn print_child(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        if self.facts.is_ignored(id) {
            return Ok(self.passthrough(id));
        }
        self.print(id)
    }

    /// Lays out the children of `id`, forced one per line or grouped.
    pub fn layout_children(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        let node = self.node(id);
        if !node.kind.has_children() {
            return Err(FormatError::ChildlessLayout { kind: node.kind });
        }

        if self.facts.must_force_multiline_children(id) {
            let mut parts = vec![Doc::BreakParent];
            for &child in &node.children {
                if let Some(prev) = self.node(child).prev {
                    let between = self.break_between(prev, child);
                    if between != Break::None {
                        parts.push(between.doc());
                        if self.facts.should_preserve_blank_line_after(prev) {
                            parts.push(hardline());
                        }
                    }
                }
                parts.push(self.print_child(child)?);
            }
            return Ok(concat(parts));
        }

        let ids = self.group_ids.issue_many(node.children.len());
        let mut parts = Vec::with_capacity(node.children.len());

        for (i, &child) in node.children.iter().enumerate() {
            let child_node = self.node(child);

            if self.facts.is_text_like(child) {
                let text_prev = child_node.prev.filter(|&prev| self.facts.is_text_like(prev));
                if let Some(prev) = text_prev {
                    let between = self.break_between(prev, child);
                    if between != Break::None {
                        let printed = self.print_child(child)?;
                        parts.push(if self.facts.should_preserve_blank_line_after(prev) {
                            concat(vec![hardline(), hardline(), printed])
                        } else {
                            concat(vec![between.doc(), printed])
                        });
                        continue;
                    }
                }
                parts.push(self.print_child(child)?);
                continue;
            }

            let mut prev_parts = Vec::new();
            let mut leading_parts = Vec::new();
            let mut trailing_parts = Vec::new();
            let mut next_parts = Vec::new();

            if let Some(prev) = child_node.prev {
                let between = self.break_between(prev, child);
                if between != Break::None {
                    if self.facts.should_preserve_blank_line_after(prev) {
                        prev_parts.extend([hardline(), hardline()]);
                    } else if between == Break::Hard {
                        prev_parts.push(hardline());
                    } else if self.facts.is_text_like(prev) {
                        leading_parts.push(between.doc());
                    } else {
                        leading_parts.push(if_break(nil(), softline(), Some(ids[i - 1])));
                    }
                }
            }

            if let Some(next) = child_node.next {
                let between = self.break_between(child, next);
                if between != Break::None {
                    let next_is_text = self.facts.is_text_like(next);
                    if self.facts.should_preserve_blank_line_after(child) {
                        if next_is_text {
                            next_parts.extend([hardline(), hardline()]);
                        }
                    } else if between == Break::Hard {
                        if next_is_text {
                            next_parts.push(hardline());
                        }
                    } else {
                        trailing_parts.push(between.doc());
                    }
                }
            }

            trailing_parts.insert(0, self.print_child(child)?);
            leading_parts.push(group_with_id(ids[i], concat(trailing_parts)));
            prev_parts.push(group(concat(leading_parts)));
            prev_parts.extend(next_parts);
            parts.push(concat(prev_parts));
        }

        Ok(concat(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, Tree};
    use crate::config::{FormatOptions, WhitespaceSensitivity};
    use crate::css::classify_tree;
    use crate::doc::render;
    use crate::facts::SourceFacts;
    use crate::parse::parse;
    use crate::whitespace::compute_sensitivity;

    fn prepared(source: &str) -> Tree {
        let mut tree = parse(source).unwrap();
        classify_tree(&mut tree, WhitespaceSensitivity::Css);
        compute_sensitivity(&mut tree);
        tree
    }

    /// Two text nodes `a` and `b`, sensitive to the whitespace between them.
    fn text_pair(spaced: bool) -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new(if spaced { "a b" } else { "ab" });
        let mut a = Node::new(NodeKind::TextNode, 0, 1).with_value("a");
        a.is_trailing_whitespace_sensitive = true;
        a.has_trailing_whitespace = spaced;
        let start = if spaced { 2 } else { 1 };
        let mut b = Node::new(NodeKind::TextNode, start, start + 1).with_value("b");
        b.is_leading_whitespace_sensitive = true;
        b.has_leading_whitespace = spaced;
        let a = tree.append_child(NodeId::DOCUMENT, a);
        let b = tree.append_child(NodeId::DOCUMENT, b);
        (tree, a, b)
    }

    fn layout(tree: &Tree, print_width: usize) -> String {
        let facts = SourceFacts::new(tree);
        let doc = Printer::new(&facts).print_document().unwrap();
        let options = FormatOptions {
            print_width,
            ..FormatOptions::default()
        };
        render(doc, &options)
    }

    /// Facts read from the tree, with a few pinned by the test.
    struct Pinned<'t> {
        inner: SourceFacts<'t>,
        hard_leading: Option<NodeId>,
        ignored: Option<NodeId>,
    }

    impl<'t> Pinned<'t> {
        fn new(tree: &'t Tree) -> Self {
            Pinned {
                inner: SourceFacts::new(tree),
                hard_leading: None,
                ignored: None,
            }
        }
    }

    impl NodeFacts for Pinned<'_> {
        fn tree(&self) -> &Tree {
            self.inner.tree()
        }

        fn prefers_hard_leading_break(&self, id: NodeId) -> bool {
            self.hard_leading == Some(id)
        }

        fn is_ignored(&self, id: NodeId) -> bool {
            self.ignored == Some(id)
        }
    }

    #[test]
    fn adjacent_text_without_whitespace_is_none() {
        let (tree, a, b) = text_pair(false);
        assert_eq!(break_between(&SourceFacts::new(&tree), a, b), Break::None);
        assert_eq!(layout(&tree, 80), "ab\n");
        assert_eq!(layout(&tree, 1), "ab\n");
    }

    #[test]
    fn adjacent_text_with_whitespace_is_line() {
        let (tree, a, b) = text_pair(true);
        assert_eq!(break_between(&SourceFacts::new(&tree), a, b), Break::Line);
        assert_eq!(layout(&tree, 80), "a b\n");
        assert_eq!(layout(&tree, 2), "a\nb\n");
    }

    #[test]
    fn hard_preference_wins_over_line() {
        let (tree, a, b) = text_pair(true);
        let mut facts = Pinned::new(&tree);
        facts.hard_leading = Some(b);
        assert_eq!(break_between(&facts, a, b), Break::Hard);
    }

    #[test]
    fn insensitive_text_pair_is_soft() {
        let (mut tree, a, b) = text_pair(false);
        tree.node_mut(a).is_trailing_whitespace_sensitive = false;
        assert_eq!(break_between(&SourceFacts::new(&tree), a, b), Break::Soft);

        let mut facts = Pinned::new(&tree);
        facts.hard_leading = Some(b);
        assert_eq!(break_between(&facts, a, b), Break::Hard);
    }

    #[test]
    fn self_closing_then_borrowing_text_is_none() {
        let tree = prepared("<x-icon/>text");
        let doc = tree.node(NodeId::DOCUMENT).children.clone();
        let facts = SourceFacts::new(&tree);

        assert!(facts.requires_borrowing_prev_closing_marker(doc[1]));
        assert_eq!(break_between(&facts, doc[0], doc[1]), Break::None);
        assert_eq!(layout(&tree, 80), "<x-icon />text\n");
    }

    #[test]
    fn borrowed_opening_marker_before_attributes_is_none() {
        let tree = prepared("<span>123<a href=x>y</a><b></b></span>");
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();
        let facts = SourceFacts::new(&tree);

        assert_eq!(break_between(&facts, children[0], children[1]), Break::None);
    }

    #[test]
    fn borrowed_opening_marker_before_ignored_node_is_none() {
        let tree = prepared("<span>123<b></b></span>");
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();

        let mut facts = Pinned::new(&tree);
        assert_eq!(break_between(&facts, children[0], children[1]), Break::Soft);
        facts.ignored = Some(children[1]);
        assert_eq!(break_between(&facts, children[0], children[1]), Break::None);
    }

    #[test]
    fn block_sibling_is_hard() {
        let tree = prepared("<span>a</span><div>b</div>");
        let doc = tree.node(NodeId::DOCUMENT).children.clone();
        assert_eq!(break_between(&SourceFacts::new(&tree), doc[0], doc[1]), Break::Hard);
    }

    #[test]
    fn inline_siblings_follow_source_whitespace() {
        let tree = prepared("<span><i>a</i> <i>b</i><i>c</i></span>");
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();
        let facts = SourceFacts::new(&tree);

        assert_eq!(break_between(&facts, children[0], children[1]), Break::Line);
        assert_eq!(break_between(&facts, children[1], children[2]), Break::Soft);
    }

    #[test]
    fn doubly_nested_borrow_is_hard() {
        let tree = prepared("<span><a><b>x</b></a>.</span>");
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();
        assert_eq!(break_between(&SourceFacts::new(&tree), children[0], children[1]), Break::Hard);
    }

    #[test]
    fn childless_variants_are_rejected() {
        let tree = prepared("text");
        let facts = SourceFacts::new(&tree);
        let text = tree.node(NodeId::DOCUMENT).children[0];

        assert_eq!(
            Printer::new(&facts).layout_children(text),
            Err(FormatError::ChildlessLayout {
                kind: NodeKind::TextNode
            })
        );
    }

    #[test]
    fn forced_layout_puts_each_child_on_its_own_line() {
        let tree = prepared("<ul><li>a</li>\n\n<li>b</li></ul>");
        assert_eq!(layout(&tree, 80), "<ul>\n  <li>a</li>\n\n  <li>b</li>\n</ul>\n");
    }

    #[test]
    fn grouped_layout_keeps_children_on_one_line_when_they_fit() {
        let tree = prepared("<div><span>one</span> <span>two</span></div>");
        assert_eq!(layout(&tree, 80), "<div><span>one</span> <span>two</span></div>\n");
        assert_eq!(
            layout(&tree, 20),
            "<div>\n  <span>one</span>\n  <span>two</span>\n</div>\n"
        );
    }
}
