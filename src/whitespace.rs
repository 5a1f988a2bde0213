// src/whitespace.rs
//
// Leading/trailing whitespace sensitivity of every child, derived from the
// classified display values. Runs once, after `css::classify_tree`.

use crate::ast::{Node, NodeId, NodeKind, Tree};
use crate::css::CssDisplay;

/// Text and drops run together as inline content.
fn is_inline_text(node: &Node) -> bool {
    matches!(node.kind, NodeKind::TextNode | NodeKind::LiquidDrop)
}

/// `{{-` / `{%-` on the node's first delimiter.
fn strips_before(node: &Node) -> bool {
    node.strip.left
}

/// `-}}` / `-%}` on the node's last delimiter.
fn strips_after(node: &Node) -> bool {
    match node.kind {
        NodeKind::LiquidTag if !node.children.is_empty() => node.close_strip.right,
        NodeKind::LiquidRawTag => node.close_strip.right,
        _ => node.strip.right,
    }
}

fn is_leading_sensitive(tree: &Tree, id: NodeId) -> bool {
    let node = tree.node(id);
    let prev = node.prev.map(|prev| tree.node(prev));

    if prev.is_some_and(is_inline_text) && is_inline_text(node) {
        return true;
    }
    let Some(parent) = node.parent.map(|parent| tree.node(parent)) else {
        return true;
    };
    if parent.css_display == CssDisplay::None || parent.css_whitespace.is_pre_like() {
        return true;
    }
    if strips_before(node) || prev.is_some_and(strips_after) {
        return false;
    }
    match prev {
        None => {
            if parent.kind == NodeKind::Document
                || node.css_whitespace.is_pre_like()
                || !parent.css_display.is_first_child_leading_space_sensitive()
            {
                return false;
            }
        }
        Some(prev) => {
            if !prev.css_display.is_next_leading_space_sensitive() {
                return false;
            }
        }
    }
    !node.css_display.is_block_like()
}

fn is_trailing_sensitive(tree: &Tree, id: NodeId) -> bool {
    let node = tree.node(id);
    let next = node.next.map(|next| tree.node(next));

    if next.is_some_and(is_inline_text) && is_inline_text(node) {
        return true;
    }
    let Some(parent) = node.parent.map(|parent| tree.node(parent)) else {
        return true;
    };
    if parent.css_display == CssDisplay::None || parent.css_whitespace.is_pre_like() {
        return true;
    }
    if strips_after(node) || next.is_some_and(strips_before) {
        return false;
    }
    match next {
        None => {
            if parent.kind == NodeKind::Document
                || node.css_whitespace.is_pre_like()
                || !parent.css_display.is_last_child_trailing_space_sensitive()
            {
                return false;
            }
        }
        Some(next) => {
            if !next.css_display.is_prev_trailing_space_sensitive() {
                return false;
            }
        }
    }
    !node.css_display.is_block_like()
}

/// Fills `is_leading_whitespace_sensitive` / `is_trailing_whitespace_sensitive`
/// on every child. A boundary between siblings is sensitive only when both
/// sides agree.
pub fn compute_sensitivity(tree: &mut Tree) {
    let parents: Vec<NodeId> = tree
        .ids()
        .filter(|&id| tree.node(id).kind.has_children())
        .collect();

    for parent in parents {
        let children = tree.node(parent).children.clone();
        let flags: Vec<(bool, bool)> = children
            .iter()
            .map(|&child| (is_leading_sensitive(tree, child), is_trailing_sensitive(tree, child)))
            .collect();

        for (i, &child) in children.iter().enumerate() {
            let (mut leading, mut trailing) = flags[i];
            if i > 0 {
                leading &= flags[i - 1].1;
            }
            if let Some(&(next_leading, _)) = flags.get(i + 1) {
                trailing &= next_leading;
            }
            let node = tree.node_mut(child);
            node.is_leading_whitespace_sensitive = leading;
            node.is_trailing_whitespace_sensitive = trailing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitespaceSensitivity;
    use crate::css::classify_tree;
    use crate::parse::parse;

    fn prepared(source: &str, mode: WhitespaceSensitivity) -> Tree {
        let mut tree = parse(source).unwrap();
        classify_tree(&mut tree, mode);
        compute_sensitivity(&mut tree);
        tree
    }

    fn flags(tree: &Tree, id: NodeId) -> (bool, bool) {
        let node = tree.node(id);
        (node.is_leading_whitespace_sensitive, node.is_trailing_whitespace_sensitive)
    }

    #[test]
    fn inline_siblings_are_sensitive_between_each_other() {
        let tree = prepared("<p>a <b>b</b> c</p>", WhitespaceSensitivity::Css);
        let p = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(p).children.clone();

        assert_eq!(flags(&tree, children[0]), (false, true));
        assert_eq!(flags(&tree, children[1]), (true, true));
        assert_eq!(flags(&tree, children[2]), (true, false));
    }

    #[test]
    fn block_siblings_are_insensitive() {
        let tree = prepared("<div>a</div> text <div>b</div>", WhitespaceSensitivity::Css);
        let doc = tree.node(NodeId::DOCUMENT).children.clone();

        assert_eq!(flags(&tree, doc[0]), (false, false));
        assert_eq!(flags(&tree, doc[1]), (false, false));
        assert_eq!(flags(&tree, doc[2]), (false, false));
    }

    #[test]
    fn strict_mode_makes_elements_sensitive() {
        let tree = prepared("<section><div>a</div><div>b</div></section>", WhitespaceSensitivity::Strict);
        let section = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(section).children.clone();

        assert_eq!(flags(&tree, children[0]), (true, true));
        assert_eq!(flags(&tree, children[1]), (true, true));
        // Document edges stay insensitive.
        assert_eq!(flags(&tree, section), (false, false));
    }

    #[test]
    fn text_next_to_a_drop_is_always_sensitive() {
        let tree = prepared("<div>Hi {{ name }}</div>", WhitespaceSensitivity::Ignore);
        let div = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(div).children.clone();

        assert!(tree.node(children[0]).is_trailing_whitespace_sensitive);
        assert!(tree.node(children[1]).is_leading_whitespace_sensitive);
    }

    #[test]
    fn stripped_liquid_boundaries_are_insensitive() {
        let tree = prepared("<span>a {{- b }} c</span>", WhitespaceSensitivity::Css);
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();

        // Text next to a drop stays sensitive even when the drop strips.
        assert_eq!(flags(&tree, children[1]), (true, true));

        let tree = prepared("<span><b>a</b>{%- render 'x' %}</span>", WhitespaceSensitivity::Strict);
        let span = tree.node(NodeId::DOCUMENT).children[0];
        let children = tree.node(span).children.clone();
        assert!(!tree.node(children[0]).is_trailing_whitespace_sensitive);
        assert!(!tree.node(children[1]).is_leading_whitespace_sensitive);
    }

    #[test]
    fn display_none_parent_keeps_everything_sensitive() {
        let tree = prepared("<!-- display: none --><span><div>a</div></span>", WhitespaceSensitivity::Css);
        let span = tree.node(NodeId::DOCUMENT).children[1];
        let div = tree.node(span).children[0];
        assert_eq!(flags(&tree, div), (true, true));
    }
}
