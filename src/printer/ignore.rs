// src/printer/ignore.rs
//
// prettier-ignore: the node after the directive is printed exactly as
// written, minus the markers its neighbours print on its behalf.

use log::trace;

use crate::ast::NodeId;
use crate::doc::{concat, text, verbatim, Doc};

use super::Printer;

impl Printer<'_> {
    /// Source of `id` without the opening marker its previous sibling
    /// borrowed and the closing marker its next sibling borrowed.
    pub(super) fn unborrowed_source(&self, id: NodeId) -> &str {
        let node = self.node(id);
        let mut start = node.start;
        let mut end = node.end;

        if node
            .prev
            .is_some_and(|prev| self.facts.requires_borrowing_next_opening_marker(prev))
        {
            start = (start + self.opening_start_marker(id).len()).min(end);
        }
        if node
            .next
            .is_some_and(|next| self.facts.requires_borrowing_prev_closing_marker(next))
        {
            end = end.saturating_sub(self.closing_end_marker(id).len()).max(start);
        }
        self.tree().slice(start..end)
    }

    pub(super) fn passthrough(&self, id: NodeId) -> Doc {
        let source = self.unborrowed_source(id);
        trace!(
            target: "reformaliquid::printer",
            "ignored {} at {}: {} bytes verbatim",
            self.node(id).kind,
            self.node(id).start,
            source.len()
        );
        concat(vec![
            text(self.opening_tag_prefix(id)),
            verbatim(source),
            text(self.closing_tag_suffix(id)),
        ])
    }
}
