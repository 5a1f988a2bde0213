// src/printer/liquid.rs
//
// Liquid drops, tags, block branches and raw tags.

use crate::ast::{Node, NodeId};
use crate::doc::{concat, group, indent, line, nil, softline, text, verbatim, Doc};
use crate::error::FormatError;

use super::Printer;

fn tag_markup(open: &str, name: &str, markup: &str, close: &str) -> String {
    if markup.is_empty() {
        format!("{{%{open} {name} {close}%}}")
    } else {
        format!("{{%{open} {name} {markup} {close}%}}")
    }
}

fn opening_tag(node: &Node) -> String {
    tag_markup(node.strip.open(), node.name(), &node.value, node.strip.close())
}

fn closing_tag(node: &Node) -> String {
    let name = format!("end{}", node.name());
    tag_markup(node.close_strip.open(), &name, "", node.close_strip.close())
}

impl Printer<'_> {
    pub(super) fn print_drop(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let (open, close) = (node.strip.open(), node.strip.close());
        let drop = if node.value.is_empty() {
            format!("{{{{{open}{close}}}}}")
        } else {
            format!("{{{{{open} {} {close}}}}}", node.value)
        };
        concat(vec![
            text(self.opening_tag_prefix(id)),
            verbatim(&drop),
            text(self.closing_tag_suffix(id)),
        ])
    }

    pub(super) fn print_liquid_tag(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        let node = self.node(id);
        let prefix = text(self.opening_tag_prefix(id));
        let suffix = text(self.closing_tag_suffix(id));

        if node.children.is_empty() {
            return Ok(concat(vec![prefix, verbatim(&opening_tag(node)), suffix]));
        }

        let mut parts = vec![verbatim(&opening_tag(node))];
        let mut has_content = false;
        for &branch in &node.children {
            has_content |= !self.node(branch).children.is_empty();
            parts.push(self.print_branch(branch)?);
        }
        parts.push(text(closing_tag(node)));
        if has_content && node.css_display.is_block_like() {
            parts.push(Doc::BreakParent);
        }

        Ok(concat(vec![prefix, group(concat(parts)), suffix]))
    }

    /// `{% else %}`, `{% when x %}` and the unnamed branch right after the
    /// opening tag, with the branch body indented under it.
    pub(super) fn print_branch(&mut self, id: NodeId) -> Result<Doc, FormatError> {
        let node = self.node(id);
        let open = if node.name.is_some() {
            verbatim(&opening_tag(node))
        } else {
            nil()
        };

        let (Some(first), Some(last)) = (node.first_child(), node.last_child()) else {
            let dangling = if node.has_dangling_whitespace { line() } else { nil() };
            return Ok(concat(vec![open, dangling]));
        };

        let first_node = self.node(first);
        let leading = if first_node.has_leading_whitespace && first_node.is_leading_whitespace_sensitive {
            line()
        } else {
            softline()
        };
        let last_node = self.node(last);
        let trailing = if last_node.has_trailing_whitespace && last_node.is_trailing_whitespace_sensitive {
            line()
        } else {
            softline()
        };

        let children = self.layout_children(id)?;
        Ok(concat(vec![
            open,
            indent(concat(vec![leading, children])),
            trailing,
        ]))
    }

    /// `{% raw %}`, `{% comment %}` and other tags whose body is not Liquid.
    pub(super) fn print_liquid_raw_tag(&self, id: NodeId) -> Doc {
        let node = self.node(id);
        let body = node
            .body
            .clone()
            .map_or("", |range| self.tree().slice(range));
        concat(vec![
            text(self.opening_tag_prefix(id)),
            verbatim(&opening_tag(node)),
            verbatim(body),
            text(closing_tag(node)),
            text(self.closing_tag_suffix(id)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{FormatOptions, WhitespaceSensitivity};
    use crate::format;

    fn fmt(source: &str, print_width: usize) -> String {
        let options = FormatOptions {
            print_width,
            ..FormatOptions::default()
        };
        format(source, &options).unwrap()
    }

    fn fmt_strict(source: &str) -> String {
        let options = FormatOptions {
            whitespace_sensitivity: WhitespaceSensitivity::Strict,
            ..FormatOptions::default()
        };
        format(source, &options).unwrap()
    }

    #[test]
    fn drops_are_normalised() {
        assert_eq!(fmt("{{product.title}}", 80), "{{ product.title }}\n");
        assert_eq!(fmt("{{-  x | upcase  -}}", 80), "{{- x | upcase -}}\n");
        assert_eq!(fmt("{{ }}", 80), "{{}}\n");
    }

    #[test]
    fn inline_block_tag_keeps_branches_flat_and_breaks_its_parent() {
        assert_eq!(
            fmt_strict("<span>{% if a %}yes{% else %}no{% endif %}</span>"),
            "<span\n  >{% if a %}yes{% else %}no{% endif %}</span\n>\n"
        );
    }

    #[test]
    fn inline_leaf_tag_stays_flat_when_it_fits() {
        assert_eq!(
            fmt_strict("<span>{% render 'card' %}</span>"),
            "<span>{% render 'card' %}</span>\n"
        );
    }

    #[test]
    fn block_tag_breaks_and_indents_branches() {
        assert_eq!(
            fmt("{% if a %}<div>yes</div>{% else %}<p>no</p>{% endif %}", 80),
            "{% if a %}\n  <div>yes</div>\n{% else %}\n  <p>no</p>\n{% endif %}\n"
        );
    }

    #[test]
    fn whitespace_control_is_kept() {
        assert_eq!(
            fmt("{%- if a -%} x {%- endif -%}", 80),
            "{%- if a -%}\n  x\n{%- endif -%}\n"
        );
    }

    #[test]
    fn raw_tags_keep_their_body() {
        let source = "{% raw %}\n  {{ not   parsed }}\n{% endraw %}\n";
        assert_eq!(fmt(source, 80), source);
    }

    #[test]
    fn leaf_tags_print_name_and_markup() {
        assert_eq!(fmt("{%render   'card' %}", 80), "{% render 'card' %}\n");
    }
}
