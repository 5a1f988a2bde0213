// src/printer/element.rs
//
// HTML elements, raw elements, comments, text and attributes.

use crate::ast::{NodeId, NodeKind};
use crate::doc::{
    concat, fill, group, indent, join, line, nil, softline, text, verbatim, Doc,
};
use crate::error::FormatError;

use super::Printer;

impl Printer<'_> {
    /// `<name attrs>` without the closing tag; void and self-closing
    /// elements end with their attributes.
    fn opening_tag(&self, id: NodeId) -> Doc {
        let end = if self.facts.is_self_closing(id) {
            ""
        } else {
            self.opening_tag_end(id)
        };
        group(concat(vec![
            text(self.opening_tag_start(id)),
            self.print_attributes(id),
            text(end),
        ]))
    }

    fn print_attributes(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let self_closing = node.kind == NodeKind::HtmlSelfClosingElement;
        if node.attributes.is_empty() {
            return text(if self_closing { " " } else { "" });
        }

        let attributes = node
            .attributes
            .iter()
            .map(|&attribute| self.print_attribute(attribute))
            .collect();

        // The opening `>` (or `/>`) is glued to content that borrowed it.
        let glued = node
            .first_child()
            .is_some_and(|first| self.facts.requires_borrowing_parent_opening_end_marker(first))
            || (self_closing
                && node
                    .parent
                    .is_some_and(|parent| self.facts.requires_borrowing_last_child_closing_end_marker(parent)));

        let close = match (glued, self_closing) {
            (true, true) => text(" "),
            (true, false) => nil(),
            (false, true) => line(),
            (false, false) => softline(),
        };
        concat(vec![indent(concat(vec![line(), join(line(), attributes)])), close])
    }

    pub(super) fn print_attribute(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let name = node.name();
        match node.kind {
            NodeKind::AttrDoubleQuoted => concat(vec![
                text(format!("{name}=\"")),
                verbatim(&node.value),
                text("\""),
            ]),
            NodeKind::AttrSingleQuoted => concat(vec![
                text(format!("{name}='")),
                verbatim(&node.value),
                text("'"),
            ]),
            NodeKind::AttrUnquoted => text(format!("{name}={}", node.value)),
            _ => verbatim(name),
        }
    }

    pub(super) fn print_element(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        let node = self.node(id);

        let body = match (node.first_child(), node.last_child()) {
            (Some(first), Some(last)) => {
                let first_node = self.node(first);
                let leading = if first_node.has_leading_whitespace
                    && first_node.is_leading_whitespace_sensitive
                {
                    line()
                } else {
                    softline()
                };
                let force = if self.facts.must_force_break_content(id) {
                    Doc::BreakParent
                } else {
                    nil()
                };
                let children = self.layout_children(id)?;
                concat(vec![
                    force,
                    indent(concat(vec![leading, children])),
                    self.line_after_children(id, last),
                ])
            }
            _ => {
                if node.has_dangling_whitespace && node.css_display.is_dangling_space_sensitive() {
                    line()
                } else {
                    nil()
                }
            }
        };

        Ok(group(concat(vec![
            self.opening_tag(id),
            body,
            text(self.closing_tag(id)),
        ])))
    }

    fn line_after_children(&self, id: NodeId, last: NodeId) -> Doc {
        let last_node = self.node(last);
        let spaced = last_node.has_trailing_whitespace && last_node.is_trailing_whitespace_sensitive;
        if self.closing_end_borrowed(id) {
            return if spaced { text(" ") } else { nil() };
        }
        if spaced {
            line()
        } else {
            softline()
        }
    }

    pub(super) fn print_void_element(&self, id: NodeId) -> Doc {
        concat(vec![self.opening_tag(id), text(self.closing_tag(id))])
    }

    /// `<script>`, `<pre>` and friends: the body is copied as written.
    pub(super) fn print_raw_element(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let body = node
            .body
            .clone()
            .map_or("", |range| self.tree().slice(range));
        concat(vec![
            self.opening_tag(id),
            verbatim(body),
            text(self.closing_tag(id)),
        ])
    }

    pub(super) fn print_comment(&self, id: NodeId) -> Doc {
        concat(vec![
            text(self.opening_tag_prefix(id)),
            verbatim(self.unborrowed_source(id)),
            text(self.closing_tag_suffix(id)),
        ])
    }

    /// Words joined by `line` in a fill; borrowed markers stick to the
    /// first and last word.
    pub(super) fn print_text(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let prefix = self.opening_tag_prefix(id);
        let suffix = self.closing_tag_suffix(id);

        let words: Vec<&str> = node.value.split_ascii_whitespace().collect();
        let last = words.len().saturating_sub(1);
        let mut parts = Vec::with_capacity(words.len() * 2);
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                parts.push(line());
            }
            let mut piece = String::with_capacity(word.len());
            if i == 0 {
                piece.push_str(&prefix);
            }
            piece.push_str(word);
            if i == last {
                piece.push_str(&suffix);
            }
            parts.push(text(piece));
        }
        fill(parts)
    }
}
