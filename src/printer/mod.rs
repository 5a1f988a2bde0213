// src/printer/mod.rs
//
// Tree -> Doc.
//
// `children` decides the break between every pair of siblings and lays a
// node's children out; `tag` owns the boundary markers; `element` and
// `liquid` print the individual node kinds; `ignore` copies regions marked
// with a prettier-ignore directive verbatim.

mod children;
mod element;
mod ignore;
mod liquid;
mod tag;

use crate::ast::{Node, NodeId, NodeKind, Tree};
use crate::doc::{concat, group, hardline, nil, Doc, GroupIds};
use crate::error::FormatError;
use crate::facts::NodeFacts;

pub use children::{break_between, Break};

pub struct Printer<'a> {
    facts: &'a dyn NodeFacts,
    group_ids: GroupIds,
}

impl<'a> Printer<'a> {
    pub fn new(facts: &'a dyn NodeFacts) -> Self {
        Printer {
            facts,
            group_ids: GroupIds::default(),
        }
    }

    fn tree(&self) -> &'a Tree {
        self.facts.tree()
    }

    fn node(&self, id: NodeId) -> &'a Node {
        self.tree().node(id)
    }

    /// The whole document, terminated by a newline when it has any content.
    pub fn print_document(&mut self) -> Result<Doc, FormatError> {
        if self.node(NodeId::DOCUMENT).children.is_empty() {
            return Ok(nil());
        }
        let children = self.layout_children(NodeId::DOCUMENT)?;
        Ok(concat(vec![group(children), hardline()]))
    }

    fn print(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        match self.node(id).kind {
            NodeKind::Document => self.print_document(),
            NodeKind::HtmlElement => self.print_element(id),
            NodeKind::HtmlVoidElement | NodeKind::HtmlSelfClosingElement => {
                Ok(self.print_void_element(id))
            }
            NodeKind::HtmlRawNode => Ok(self.print_raw_element(id)),
            NodeKind::HtmlComment => Ok(self.print_comment(id)),
            NodeKind::TextNode => Ok(self.print_text(id)),
            NodeKind::LiquidDrop => Ok(self.print_drop(id)),
            NodeKind::LiquidTag => self.print_liquid_tag(id),
            NodeKind::LiquidRawTag => Ok(self.print_liquid_raw_tag(id)),
            NodeKind::LiquidBranch => self.print_branch(id),
            NodeKind::AttrDoubleQuoted
            | NodeKind::AttrSingleQuoted
            | NodeKind::AttrUnquoted
            | NodeKind::AttrEmpty => Ok(self.print_attribute(id)),
        }
    }
}
