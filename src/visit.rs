// src/visit.rs
//
// Depth-first traversal with optional hooks. A visitor implements only the
// hooks it needs; the rest default to no-ops.

use crate::ast::{NodeId, Tree};

pub trait Visitor {
    /// Called before the node's children and attributes are visited.
    fn enter(&mut self, _tree: &Tree, _id: NodeId) {}

    /// Called after the node's children and attributes are visited.
    fn exit(&mut self, _tree: &Tree, _id: NodeId) {}
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Visits every node in document order: a node, then its attributes, then its children.
pub fn walk<V: Visitor + ?Sized>(tree: &Tree, visitor: &mut V) {
    let mut stack = vec![Step::Enter(NodeId::DOCUMENT)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                visitor.enter(tree, id);
                stack.push(Step::Exit(id));
                let node = tree.node(id);
                for &child in node.children.iter().rev() {
                    stack.push(Step::Enter(child));
                }
                for &attribute in node.attributes.iter().rev() {
                    stack.push(Step::Enter(attribute));
                }
            }
            Step::Exit(id) => visitor.exit(tree, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeKind};

    #[derive(Default)]
    struct Recorder {
        events: Vec<(char, NodeId)>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, _tree: &Tree, id: NodeId) {
            self.events.push(('>', id));
        }

        fn exit(&mut self, _tree: &Tree, id: NodeId) {
            self.events.push(('<', id));
        }
    }

    struct EnterOnly(usize);

    impl Visitor for EnterOnly {
        fn enter(&mut self, _tree: &Tree, _id: NodeId) {
            self.0 += 1;
        }
    }

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new("");
        let div = tree.append_child(NodeId::DOCUMENT, Node::new(NodeKind::HtmlElement, 0, 0));
        let class = tree.append_attribute(div, Node::new(NodeKind::AttrDoubleQuoted, 0, 0));
        let text = tree.append_child(div, Node::new(NodeKind::TextNode, 0, 0));
        (tree, div, class, text)
    }

    #[test]
    fn visits_in_document_order() {
        let (tree, div, class, text) = sample();
        let mut recorder = Recorder::default();
        walk(&tree, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                ('>', NodeId::DOCUMENT),
                ('>', div),
                ('>', class),
                ('<', class),
                ('>', text),
                ('<', text),
                ('<', div),
                ('<', NodeId::DOCUMENT),
            ]
        );
    }

    #[test]
    fn missing_hooks_are_no_ops() {
        let (tree, ..) = sample();
        let mut counter = EnterOnly(0);
        walk(&tree, &mut counter);
        assert_eq!(counter.0, 4);
    }
}
