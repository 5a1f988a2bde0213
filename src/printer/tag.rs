// src/printer/tag.rs
//
// Tag boundary markers and borrowing.
//
//   <span class="x">text</span>
//   ^^^^^          ^    ^^^^^^
//   opening start  |    closing start + closing end
//                  opening end
//
// When whitespace next to a marker is significant, the marker is printed by
// the neighbour instead, so a line break can go where whitespace already
// existed (inside the tag) and never between the tag and its content:
//
//   text<span
//     >inner</span
//   >
//
// Every node prints its own "prefix" (markers it borrowed from before it)
// and "suffix" (markers it borrowed from after it). The node that lent a
// marker prints nothing in its place.

use crate::ast::{NodeId, NodeKind};

use super::Printer;

impl Printer<'_> {
    pub(super) fn opening_start_marker(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.kind {
            NodeKind::HtmlElement
            | NodeKind::HtmlVoidElement
            | NodeKind::HtmlSelfClosingElement
            | NodeKind::HtmlRawNode => format!("<{}", node.name()),
            NodeKind::HtmlComment => "<!--".to_string(),
            _ => String::new(),
        }
    }

    pub(super) fn opening_end_marker(&self, id: NodeId) -> &'static str {
        match self.node(id).kind {
            NodeKind::HtmlElement | NodeKind::HtmlRawNode => ">",
            _ => "",
        }
    }

    pub(super) fn closing_start_marker(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.kind {
            NodeKind::HtmlElement | NodeKind::HtmlRawNode => format!("</{}", node.name()),
            _ => String::new(),
        }
    }

    pub(super) fn closing_end_marker(&self, id: NodeId) -> &'static str {
        match self.node(id).kind {
            NodeKind::HtmlSelfClosingElement => "/>",
            NodeKind::HtmlElement | NodeKind::HtmlRawNode | NodeKind::HtmlVoidElement => ">",
            NodeKind::HtmlComment => "-->",
            _ => "",
        }
    }

    /// Markers this node prints on behalf of its parent or previous sibling.
    pub(super) fn opening_tag_prefix(&self, id: NodeId) -> String {
        let node = self.node(id);
        if self.facts.requires_borrowing_parent_opening_end_marker(id) {
            if let Some(parent) = node.parent {
                return self.opening_end_marker(parent).to_string();
            }
        }
        if self.facts.requires_borrowing_prev_closing_marker(id) {
            if let Some(prev) = node.prev {
                return self.closing_end_marker(prev).to_string();
            }
        }
        String::new()
    }

    /// Markers this node prints on behalf of its parent or next sibling.
    pub(super) fn closing_tag_suffix(&self, id: NodeId) -> String {
        let node = self.node(id);
        if self.facts.requires_borrowing_parent_closing_start_marker(id) {
            if let Some(parent) = node.parent {
                return self.closing_start_marker(parent);
            }
        }
        if self.facts.requires_borrowing_next_opening_marker(id) {
            if let Some(next) = node.next {
                return self.opening_start_marker(next);
            }
        }
        String::new()
    }

    /// The `>` of the last child's closing tag, when this element prints it.
    pub(super) fn closing_tag_prefix(&self, id: NodeId) -> String {
        if self.facts.requires_borrowing_last_child_closing_end_marker(id) {
            if let Some(last) = self.node(id).last_child() {
                return self.closing_end_marker(last).to_string();
            }
        }
        String::new()
    }

    /// `<name` with its prefix, or nothing when the previous sibling printed it.
    pub(super) fn opening_tag_start(&self, id: NodeId) -> String {
        let borrowed = self
            .node(id)
            .prev
            .is_some_and(|prev| self.facts.requires_borrowing_next_opening_marker(prev));
        if borrowed {
            return String::new();
        }
        self.opening_tag_prefix(id) + &self.opening_start_marker(id)
    }

    /// `>` of the opening tag, or nothing when the first child printed it.
    pub(super) fn opening_tag_end(&self, id: NodeId) -> &'static str {
        let borrowed = self
            .node(id)
            .first_child()
            .is_some_and(|first| self.facts.requires_borrowing_parent_opening_end_marker(first));
        if borrowed {
            ""
        } else {
            self.opening_end_marker(id)
        }
    }

    /// `</name` with its prefix, or nothing when the last child printed it.
    pub(super) fn closing_tag_start(&self, id: NodeId) -> String {
        let borrowed = self
            .node(id)
            .last_child()
            .is_some_and(|last| self.facts.requires_borrowing_parent_closing_start_marker(last));
        if borrowed {
            return String::new();
        }
        self.closing_tag_prefix(id) + &self.closing_start_marker(id)
    }

    /// Whether the closing `>` is printed by the next sibling or the parent.
    pub(super) fn closing_end_borrowed(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.next {
            Some(next) => self.facts.requires_borrowing_prev_closing_marker(next),
            None => node
                .parent
                .is_some_and(|parent| self.facts.requires_borrowing_last_child_closing_end_marker(parent)),
        }
    }

    /// `>` (or `/>`) of the closing tag with its suffix.
    pub(super) fn closing_tag_end(&self, id: NodeId) -> String {
        if self.closing_end_borrowed(id) {
            return String::new();
        }
        self.closing_end_marker(id).to_string() + &self.closing_tag_suffix(id)
    }

    /// The whole closing tag; void and self-closing elements only have the end.
    pub(super) fn closing_tag(&self, id: NodeId) -> String {
        let start = if self.facts.is_self_closing(id) {
            String::new()
        } else {
            self.closing_tag_start(id)
        };
        start + &self.closing_tag_end(id)
    }
}
