// src/parse.rs
//
// HTML + Liquid parser building the arena tree.
//
// - Byte-oriented scanning with memchr; every structural delimiter is ASCII,
//   so slicing the source at those offsets stays on char boundaries.
// - Whitespace-only text between siblings is not kept as a node. It is
//   recorded as `has_trailing_whitespace` on the previous sibling and
//   `has_leading_whitespace` on the next one; text nodes are trimmed the same
//   way. An element or branch with only whitespace inside gets
//   `has_dangling_whitespace`.
// - RAW-TEXT elements (script, style, pre, textarea, listing, xmp, plaintext)
//   and Liquid raw tags keep their body as a source range, never as children.
// - Liquid block tags own one `LiquidBranch` per block: an unnamed first one,
//   then one for every `elsif` / `else` / `when`.
// - Mismatched or missing closing tags are errors; nothing is auto-closed.

use log::debug;
use memchr::{memchr, memchr2, memmem};

use crate::ast::{Node, NodeId, NodeKind, Strip, Tree};
use crate::error::FormatError;

/* =============================== Core sets =============================== */

fn is_void(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
            b"param", b"source", b"track", b"wbr",
        ],
    )
}

fn is_raw_text(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[b"script", b"style", b"pre", b"textarea", b"listing", b"xmp", b"plaintext"],
    )
}

const LIQUID_BLOCKS: &[&str] = &[
    "if", "unless", "case", "for", "tablerow", "capture", "form", "paginate",
];

const LIQUID_RAW: &[&str] = &["raw", "comment", "javascript", "schema", "style", "stylesheet"];

const LIQUID_BRANCHES: &[&str] = &["else", "elsif", "when"];

/* ============================ Utility predicates ========================= */

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0c'
}

fn matches_ignore_ascii_case(name: &[u8], set: &[&[u8]]) -> bool {
    set.iter().any(|&s| name.eq_ignore_ascii_case(s))
}

/// Closing delimiter when `s[i..]` opens a Liquid drop or tag.
fn liquid_close(s: &[u8], i: usize) -> Option<&'static [u8]> {
    match s.get(i..i + 2) {
        Some(b"{{") => Some(b"}}"),
        Some(b"{%") => Some(b"%}"),
        _ => None,
    }
}

fn find(s: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    memmem::find(s.get(from..)?, needle).map(|off| from + off)
}

/// Splits Liquid whitespace-control dashes off the inside of `{{ }}` / `{% %}`.
fn split_strip(inner: &str) -> (Strip, &str) {
    let mut rest = inner;
    let left = rest.starts_with('-');
    if left {
        rest = &rest[1..];
    }
    let right = rest.ends_with('-');
    if right {
        rest = &rest[..rest.len() - 1];
    }
    (Strip { left, right }, rest.trim())
}

/// `name markup` of a Liquid tag; `# comment` tags are named `#`.
fn split_tag(inner: &str) -> (&str, &str) {
    if let Some(rest) = inner.strip_prefix('#') {
        return ("#", rest.trim());
    }
    match inner.find(|c: char| c.is_ascii_whitespace()) {
        Some(p) => (&inner[..p], inner[p..].trim()),
        None => (inner, ""),
    }
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug)]
struct TagInfo {
    name_start: usize,
    name_end: usize,
    attrs_end: usize,
    self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware
/// and skipping over embedded Liquid.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        if let Some(close) = liquid_close(s, i) {
            i = find(s, i + 2, close)? + 2;
            continue;
        }
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Locate the name and the attribute region inside raw `<...>` bytes.
fn parse_tag_info(tag: &[u8]) -> TagInfo {
    let n = tag.len();
    let mut i = 1;
    if i < n && tag[i] == b'/' {
        i += 1;
    }
    let name_start = i;
    while i < n && !is_ws(tag[i]) && tag[i] != b'>' && tag[i] != b'/' {
        i += 1;
    }
    let name_end = i;

    // self-closing? check before '>'
    let mut j = n - 1;
    while j > name_end && is_ws(tag[j - 1]) {
        j -= 1;
    }
    let self_closing = j > name_end && tag[j - 1] == b'/';

    TagInfo {
        name_start,
        name_end,
        attrs_end: if self_closing { j - 1 } else { n - 1 },
        self_closing,
    }
}

/* ================================ Parser =================================== */

#[derive(Clone, Copy, Debug)]
enum Markup {
    Comment,
    Declaration,
    OpenTag,
    CloseTag,
    Drop,
    Tag,
}

/// An open element or Liquid block. Children go into `container`, which is
/// the element itself or the block's current branch.
struct Frame {
    node: NodeId,
    container: NodeId,
}

struct Parser<'s> {
    text: &'s str,
    src: &'s [u8],
    tree: Tree,
    frames: Vec<Frame>,
    /// Whitespace seen after the last child appended to the current container.
    pending_whitespace: bool,
}

pub fn parse(source: &str) -> Result<Tree, FormatError> {
    let mut parser = Parser {
        text: source,
        src: source.as_bytes(),
        tree: Tree::new(source),
        frames: Vec::new(),
        pending_whitespace: false,
    };
    parser.run()?;
    debug!(target: "reformaliquid::parse", "parsed {} nodes from {} bytes", parser.tree.len(), source.len());
    Ok(parser.tree)
}

fn closing_hint(node: &Node) -> String {
    match node.kind {
        NodeKind::LiquidTag => format!("{{% end{} %}}", node.name()),
        _ => format!("</{}>", node.name()),
    }
}

impl<'s> Parser<'s> {
    fn container(&self) -> NodeId {
        self.frames.last().map_or(NodeId::DOCUMENT, |frame| frame.container)
    }

    fn run(&mut self) -> Result<(), FormatError> {
        let n = self.src.len();
        let mut i = 0usize;
        let mut text_start = 0usize;

        while i < n {
            let Some(pos) = memchr2(b'<', b'{', &self.src[i..]).map(|off| i + off) else {
                break;
            };
            let Some(markup) = self.markup_at(pos) else {
                i = pos + 1;
                continue;
            };
            if text_start < pos {
                self.text_run(text_start, pos);
            }
            i = match markup {
                Markup::Comment => self.comment(pos)?,
                Markup::Declaration => self.declaration(pos)?,
                Markup::OpenTag => self.open_tag(pos)?,
                Markup::CloseTag => self.close_tag(pos)?,
                Markup::Drop => self.drop(pos)?,
                Markup::Tag => self.liquid_tag(pos)?,
            };
            text_start = i;
        }
        if text_start < n {
            self.text_run(text_start, n);
        }

        if let Some(frame) = self.frames.last() {
            let node = self.tree.node(frame.node);
            return Err(FormatError::parse(
                node.start,
                format!("missing {}", closing_hint(node)),
            ));
        }
        Ok(())
    }

    fn markup_at(&self, i: usize) -> Option<Markup> {
        let rest = &self.src[i..];
        let alpha_at = |k: usize| rest.get(k).is_some_and(|b| b.is_ascii_alphabetic());
        if rest.starts_with(b"<!--") {
            Some(Markup::Comment)
        } else if rest.starts_with(b"<!") {
            Some(Markup::Declaration)
        } else if rest.starts_with(b"</") && alpha_at(2) {
            Some(Markup::CloseTag)
        } else if rest.starts_with(b"<") && alpha_at(1) {
            Some(Markup::OpenTag)
        } else if rest.starts_with(b"{{") {
            Some(Markup::Drop)
        } else if rest.starts_with(b"{%") {
            Some(Markup::Tag)
        } else {
            None
        }
    }

    /* ------------------------------ Whitespace ------------------------------ */

    fn whitespace(&mut self) {
        if let Some(last) = self.tree.node(self.container()).last_child() {
            self.tree.node_mut(last).has_trailing_whitespace = true;
        }
        self.pending_whitespace = true;
    }

    fn append(&mut self, mut node: Node) -> NodeId {
        node.has_leading_whitespace = std::mem::take(&mut self.pending_whitespace);
        let container = self.container();
        self.tree.append_child(container, node)
    }

    fn text_run(&mut self, start: usize, end: usize) {
        let text = self.text;
        let raw = &text[start..end];
        let body = raw.trim_matches(|c: char| c.is_ascii_whitespace());
        if body.is_empty() {
            self.whitespace();
            return;
        }
        let lead = raw.len() - raw.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
        let body_start = start + lead;
        let body_end = body_start + body.len();

        if lead > 0 {
            self.whitespace();
        }
        self.append(Node::new(NodeKind::TextNode, body_start, body_end).with_value(body));
        if body_end < end {
            self.whitespace();
        }
    }

    /* ------------------------------ Containers ------------------------------ */

    fn open(&mut self, node: NodeId, container: NodeId) {
        self.frames.push(Frame { node, container });
        self.pending_whitespace = false;
    }

    fn finish_container(&mut self, container: NodeId, body_end: usize) {
        let pending = std::mem::take(&mut self.pending_whitespace);
        let node = self.tree.node_mut(container);
        if node.children.is_empty() && pending {
            node.has_dangling_whitespace = true;
        }
        if let Some(body) = node.body.as_mut() {
            body.end = body_end;
        }
        if node.kind == NodeKind::LiquidBranch {
            node.end = body_end;
        }
    }

    fn close(&mut self, body_end: usize, end: usize) {
        if let Some(frame) = self.frames.pop() {
            self.finish_container(frame.container, body_end);
            let node = self.tree.node_mut(frame.node);
            node.end = end;
            if let Some(body) = node.body.as_mut() {
                body.end = body_end;
            }
        }
        self.pending_whitespace = false;
    }

    /* --------------------------------- HTML --------------------------------- */

    fn comment(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let close = find(self.src, i + 4, b"-->")
            .ok_or_else(|| FormatError::parse(i, "unterminated comment"))?;
        let end = close + 3;
        self.append(Node::new(NodeKind::HtmlComment, i, end).with_value(&text[i + 4..close]));
        Ok(end)
    }

    /// `<!doctype html>` and friends, kept as void elements named `!doctype`.
    fn declaration(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let end = find_tag_end(self.src, i)
            .ok_or_else(|| FormatError::parse(i, "unterminated declaration"))?;
        let info = parse_tag_info(&self.src[i..=end]);
        let name = &text[i + info.name_start..i + info.name_end];
        let id = self.append(Node::new(NodeKind::HtmlVoidElement, i, end + 1).with_name(name));
        self.attributes(id, i + info.name_end, i + info.attrs_end)?;
        Ok(end + 1)
    }

    fn open_tag(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let end = find_tag_end(self.src, i).ok_or_else(|| FormatError::parse(i, "unterminated tag"))?;
        let info = parse_tag_info(&self.src[i..=end]);
        let name = &text[i + info.name_start..i + info.name_end];
        let attrs = (i + info.name_end, i + info.attrs_end);

        if info.self_closing {
            let id = self.append(
                Node::new(NodeKind::HtmlSelfClosingElement, i, end + 1).with_name(name),
            );
            self.attributes(id, attrs.0, attrs.1)?;
            return Ok(end + 1);
        }

        if is_void(name.as_bytes()) {
            let id = self.append(Node::new(NodeKind::HtmlVoidElement, i, end + 1).with_name(name));
            self.attributes(id, attrs.0, attrs.1)?;
            return Ok(end + 1);
        }

        if is_raw_text(name.as_bytes()) {
            let (body_end, close_end) = self.raw_text_end(end + 1, name)?;
            let id = self.append(
                Node::new(NodeKind::HtmlRawNode, i, close_end)
                    .with_name(name)
                    .with_value(&text[end + 1..body_end])
                    .with_body(end + 1..body_end),
            );
            self.attributes(id, attrs.0, attrs.1)?;
            return Ok(close_end);
        }

        let id = self.append(
            Node::new(NodeKind::HtmlElement, i, end + 1)
                .with_name(name)
                .with_body(end + 1..end + 1),
        );
        self.attributes(id, attrs.0, attrs.1)?;
        self.open(id, id);
        Ok(end + 1)
    }

    /// Find the **matching** end tag `</name>` of a RAW-TEXT element.
    /// Returns (start_of_end_tag, index_after_end_tag).
    fn raw_text_end(&self, from: usize, name: &str) -> Result<(usize, usize), FormatError> {
        let s = self.src;
        let name = name.as_bytes();
        let mut j = from;
        while let Some(pos) = memchr(b'<', &s[j..]).map(|off| j + off) {
            let rest = &s[pos..];
            let after = 2 + name.len();
            if rest.len() > after
                && rest[1] == b'/'
                && rest[2..after].eq_ignore_ascii_case(name)
                && (is_ws(rest[after]) || rest[after] == b'>')
            {
                let close = memchr(b'>', rest)
                    .map(|off| pos + off)
                    .ok_or_else(|| FormatError::parse(pos, "unterminated closing tag"))?;
                return Ok((pos, close + 1));
            }
            j = pos + 1;
        }
        Err(FormatError::parse(
            from,
            format!("missing </{}>", String::from_utf8_lossy(name)),
        ))
    }

    fn close_tag(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let end = find_tag_end(self.src, i).ok_or_else(|| FormatError::parse(i, "unterminated tag"))?;
        let info = parse_tag_info(&self.src[i..=end]);
        let name = &text[i + info.name_start..i + info.name_end];

        let Some(frame) = self.frames.last() else {
            return Err(FormatError::parse(i, format!("unexpected </{name}>")));
        };
        let open = self.tree.node(frame.node);
        if open.kind != NodeKind::HtmlElement || !open.name().eq_ignore_ascii_case(name) {
            return Err(FormatError::parse(
                i,
                format!("expected {} but found </{name}>", closing_hint(open)),
            ));
        }
        self.close(i, end + 1);
        Ok(end + 1)
    }

    /// Attribute scanner for `src[from..to]`: [name] ( '=' [value] )?
    /// Value may be quoted or unquoted; Liquid between attributes becomes a
    /// bare attribute holding the Liquid source.
    fn attributes(&mut self, element: NodeId, from: usize, to: usize) -> Result<(), FormatError> {
        let s = self.src;
        let text = self.text;
        let mut i = from;

        while i < to {
            // skip whitespace and slashes
            while i < to && (is_ws(s[i]) || s[i] == b'/') {
                i += 1;
            }
            if i >= to {
                break;
            }

            let start = i;
            if let Some(close) = liquid_close(s, i) {
                let end = find(s, i + 2, close)
                    .ok_or_else(|| FormatError::parse(i, "unterminated Liquid in tag"))?
                    + 2;
                self.tree.append_attribute(
                    element,
                    Node::new(NodeKind::AttrEmpty, start, end).with_name(&text[start..end]),
                );
                i = end;
                continue;
            }

            // attribute name
            while i < to && !is_ws(s[i]) && s[i] != b'=' {
                i += 1;
            }
            let name = &text[start..i];

            // skip whitespace
            let mut j = i;
            while j < to && is_ws(s[j]) {
                j += 1;
            }
            if j >= to || s[j] != b'=' {
                self.tree.append_attribute(
                    element,
                    Node::new(NodeKind::AttrEmpty, start, i).with_name(name),
                );
                continue;
            }

            // "= value"
            j += 1;
            while j < to && is_ws(s[j]) {
                j += 1;
            }
            let (kind, value, end) = if j < to && (s[j] == b'"' || s[j] == b'\'') {
                let q = s[j];
                let mut k = j + 1;
                while k < to && s[k] != q {
                    match liquid_close(s, k) {
                        Some(close) => {
                            k = find(s, k + 2, close)
                                .ok_or_else(|| FormatError::parse(k, "unterminated Liquid in attribute"))?
                                + 2;
                        }
                        None => k += 1,
                    }
                }
                if k >= to {
                    return Err(FormatError::parse(j, "unterminated attribute value"));
                }
                let kind = if q == b'"' {
                    NodeKind::AttrDoubleQuoted
                } else {
                    NodeKind::AttrSingleQuoted
                };
                (kind, &text[j + 1..k], k + 1)
            } else {
                let mut k = j;
                while k < to && !is_ws(s[k]) {
                    match liquid_close(s, k) {
                        Some(close) => {
                            k = find(s, k + 2, close)
                                .ok_or_else(|| FormatError::parse(k, "unterminated Liquid in attribute"))?
                                + 2;
                        }
                        None => k += 1,
                    }
                }
                (NodeKind::AttrUnquoted, &text[j..k.min(to)], k.min(to))
            };
            self.tree.append_attribute(
                element,
                Node::new(kind, start, end).with_name(name).with_value(value),
            );
            i = end;
        }
        Ok(())
    }

    /* -------------------------------- Liquid -------------------------------- */

    fn drop(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let close = find(self.src, i + 2, b"}}")
            .ok_or_else(|| FormatError::parse(i, "unterminated {{"))?;
        let (strip, markup) = split_strip(&text[i + 2..close]);
        let mut node = Node::new(NodeKind::LiquidDrop, i, close + 2).with_value(markup);
        node.strip = strip;
        self.append(node);
        Ok(close + 2)
    }

    fn in_liquid_block(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| self.tree.node(frame.node).kind == NodeKind::LiquidTag)
    }

    fn liquid_tag(&mut self, i: usize) -> Result<usize, FormatError> {
        let text = self.text;
        let close = find(self.src, i + 2, b"%}")
            .ok_or_else(|| FormatError::parse(i, "unterminated {%"))?;
        let end = close + 2;
        let (strip, inner) = split_strip(&text[i + 2..close]);
        let (name, markup) = split_tag(inner);

        if let Some(base) = name.strip_prefix("end") {
            if LIQUID_BLOCKS.contains(&base) {
                self.end_block(i, end, base, strip)?;
                return Ok(end);
            }
        }

        if LIQUID_BRANCHES.contains(&name) && self.in_liquid_block() {
            self.branch(i, end, name, markup, strip);
            return Ok(end);
        }

        if LIQUID_RAW.contains(&name) {
            return self.liquid_raw(i, end, name, markup, strip);
        }

        let mut node = Node::new(NodeKind::LiquidTag, i, end)
            .with_name(name)
            .with_value(markup);
        node.strip = strip;

        if LIQUID_BLOCKS.contains(&name) {
            let tag = self.append(node.with_body(end..end));
            let branch = self.tree.append_child(
                tag,
                Node::new(NodeKind::LiquidBranch, end, end).with_body(end..end),
            );
            self.open(tag, branch);
        } else {
            self.append(node);
        }
        Ok(end)
    }

    fn branch(&mut self, i: usize, end: usize, name: &str, markup: &str, strip: Strip) {
        let Some(&Frame { node: tag, container }) = self.frames.last() else {
            return;
        };
        self.finish_container(container, i);
        let mut branch = Node::new(NodeKind::LiquidBranch, i, end)
            .with_name(name)
            .with_value(markup)
            .with_body(end..end);
        branch.strip = strip;
        let branch = self.tree.append_child(tag, branch);
        if let Some(frame) = self.frames.last_mut() {
            frame.container = branch;
        }
        self.pending_whitespace = false;
    }

    fn end_block(&mut self, i: usize, end: usize, base: &str, strip: Strip) -> Result<(), FormatError> {
        let Some(frame) = self.frames.last() else {
            return Err(FormatError::parse(i, format!("unexpected {{% end{base} %}}")));
        };
        let tag = frame.node;
        let open = self.tree.node(tag);
        if open.kind != NodeKind::LiquidTag || open.name() != base {
            return Err(FormatError::parse(
                i,
                format!("expected {} but found {{% end{base} %}}", closing_hint(open)),
            ));
        }
        self.close(i, end);
        self.tree.node_mut(tag).close_strip = strip;
        Ok(())
    }

    /// `{% raw %}...{% endraw %}` and the other tags whose body is not Liquid+HTML.
    fn liquid_raw(
        &mut self,
        i: usize,
        end: usize,
        name: &str,
        markup: &str,
        strip: Strip,
    ) -> Result<usize, FormatError> {
        let text = self.text;
        let closer = format!("end{name}");
        let mut j = end;
        while let Some(pos) = find(self.src, j, b"{%") {
            let close = find(self.src, pos + 2, b"%}")
                .ok_or_else(|| FormatError::parse(pos, "unterminated {%"))?;
            let (close_strip, inner) = split_strip(&text[pos + 2..close]);
            if inner == closer {
                let mut node = Node::new(NodeKind::LiquidRawTag, i, close + 2)
                    .with_name(name)
                    .with_value(markup)
                    .with_body(end..pos);
                node.strip = strip;
                node.close_strip = close_strip;
                self.append(node);
                return Ok(close + 2);
            }
            j = pos + 2;
        }
        Err(FormatError::parse(i, format!("missing {{% {closer} %}}")))
    }
}
