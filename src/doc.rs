// src/doc.rs
//
// Abstract layout and its width-aware renderer.
//
// The printer builds a `Doc` tree out of text, indentation, groups and line
// markers. The renderer decides for every group whether it fits on the
// current line (flat) or has to break, then writes the text:
//
//   Line(Soft)     nothing when flat, newline when broken
//   Line(Normal)   one space when flat, newline when broken
//   Line(Hard)     always a newline, breaks every enclosing group
//   Line(Literal)  newline without indentation (verbatim content)
//   IfBreak        picks a branch from a group's mode, by id when given
//   Fill           packs content/separator pairs as densely as they fit

use std::collections::HashMap;

use crate::config::FormatOptions;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u32);

/// Hands out group identities for one format call.
#[derive(Debug, Default)]
pub struct GroupIds {
    next: u32,
}

impl GroupIds {
    pub fn issue(&mut self) -> GroupId {
        let id = GroupId(self.next);
        self.next += 1;
        id
    }

    pub fn issue_many(&mut self, count: usize) -> Vec<GroupId> {
        (0..count).map(|_| self.issue()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Soft,
    Normal,
    Hard,
    Literal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    Indent(Box<Doc>),
    Group {
        id: Option<GroupId>,
        contents: Box<Doc>,
        should_break: bool,
    },
    IfBreak {
        group_id: Option<GroupId>,
        broken: Box<Doc>,
        flat: Box<Doc>,
    },
    Line(LineKind),
    BreakParent,
    /// Alternating content and separator parts.
    Fill(Vec<Doc>),
}

impl Doc {
    /// True for docs that print nothing in any mode.
    pub fn is_empty(&self) -> bool {
        match self {
            Doc::Text(s) => s.is_empty(),
            Doc::Concat(parts) => parts.iter().all(Doc::is_empty),
            _ => false,
        }
    }
}

/* ================================ Builders =============================== */

pub fn nil() -> Doc {
    Doc::Concat(Vec::new())
}

pub fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub fn softline() -> Doc {
    Doc::Line(LineKind::Soft)
}

pub fn line() -> Doc {
    Doc::Line(LineKind::Normal)
}

pub fn hardline() -> Doc {
    Doc::Line(LineKind::Hard)
}

pub fn literalline() -> Doc {
    Doc::Line(LineKind::Literal)
}

pub fn concat(parts: Vec<Doc>) -> Doc {
    Doc::Concat(parts)
}

pub fn indent(contents: Doc) -> Doc {
    Doc::Indent(Box::new(contents))
}

pub fn group(contents: Doc) -> Doc {
    Doc::Group {
        id: None,
        contents: Box::new(contents),
        should_break: false,
    }
}

pub fn group_with_id(id: GroupId, contents: Doc) -> Doc {
    Doc::Group {
        id: Some(id),
        contents: Box::new(contents),
        should_break: false,
    }
}

pub fn if_break(broken: Doc, flat: Doc, group_id: Option<GroupId>) -> Doc {
    Doc::IfBreak {
        group_id,
        broken: Box::new(broken),
        flat: Box::new(flat),
    }
}

pub fn fill(parts: Vec<Doc>) -> Doc {
    Doc::Fill(parts)
}

pub fn join(separator: Doc, docs: Vec<Doc>) -> Doc {
    let mut parts = Vec::with_capacity(docs.len() * 2);
    for (i, doc) in docs.into_iter().enumerate() {
        if i > 0 {
            parts.push(separator.clone());
        }
        parts.push(doc);
    }
    Doc::Concat(parts)
}

/// Source text printed exactly as written; its newlines ignore indentation.
pub fn verbatim(source: &str) -> Doc {
    let mut parts = Vec::new();
    for (i, piece) in source.split('\n').enumerate() {
        if i > 0 {
            parts.push(literalline());
        }
        if !piece.is_empty() {
            parts.push(text(piece));
        }
    }
    Doc::Concat(parts)
}

/* ============================ Break propagation ========================== */

/// Marks every group containing a hard line or a break-parent as broken.
/// Returns whether `doc` forces its enclosing group to break.
fn propagate_breaks(doc: &mut Doc) -> bool {
    match doc {
        Doc::Text(_) => false,
        Doc::Line(kind) => matches!(kind, LineKind::Hard | LineKind::Literal),
        Doc::BreakParent => true,
        Doc::Concat(parts) | Doc::Fill(parts) => parts
            .iter_mut()
            .fold(false, |forced, part| propagate_breaks(part) || forced),
        Doc::Indent(contents) => propagate_breaks(contents),
        Doc::Group {
            contents,
            should_break,
            ..
        } => {
            if propagate_breaks(contents) {
                *should_break = true;
            }
            *should_break
        }
        Doc::IfBreak { broken, flat, .. } => {
            let broken = propagate_breaks(broken);
            let flat = propagate_breaks(flat);
            broken || flat
        }
    }
}

/* ================================ Renderer =============================== */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

#[derive(Clone, Copy)]
enum Item<'d> {
    Doc(&'d Doc),
    Concat(&'d [Doc]),
    Fill(&'d [Doc]),
}

#[derive(Clone, Copy)]
struct Cmd<'d> {
    indent: usize,
    mode: Mode,
    item: Item<'d>,
}

fn width(s: &str) -> usize {
    s.chars().count()
}

struct Renderer<'o> {
    options: &'o FormatOptions,
    out: String,
    pos: usize,
    group_modes: HashMap<GroupId, Mode>,
    remeasure: bool,
}

/// Renders `doc` against `options.print_width`.
pub fn render(mut doc: Doc, options: &FormatOptions) -> String {
    propagate_breaks(&mut doc);
    let mut renderer = Renderer {
        options,
        out: String::new(),
        pos: 0,
        group_modes: HashMap::new(),
        remeasure: false,
    };
    renderer.print(&doc);
    renderer.out
}

impl<'o> Renderer<'o> {
    fn print<'d>(&mut self, doc: &'d Doc) {
        let mut cmds = vec![Cmd {
            indent: 0,
            mode: Mode::Break,
            item: Item::Doc(doc),
        }];

        while let Some(Cmd { indent, mode, item }) = cmds.pop() {
            let doc = match item {
                Item::Doc(doc) => doc,
                Item::Concat(parts) => {
                    push_parts(&mut cmds, indent, mode, parts);
                    continue;
                }
                Item::Fill(parts) => {
                    self.fill(&mut cmds, indent, mode, parts);
                    continue;
                }
            };

            match doc {
                Doc::Text(s) => {
                    self.out.push_str(s);
                    self.pos += width(s);
                }
                Doc::Concat(parts) => push_parts(&mut cmds, indent, mode, parts),
                Doc::Fill(parts) => self.fill(&mut cmds, indent, mode, parts),
                Doc::Indent(contents) => cmds.push(Cmd {
                    indent: indent + 1,
                    mode,
                    item: Item::Doc(contents),
                }),
                Doc::Group {
                    id,
                    contents,
                    should_break,
                } => {
                    let group_mode = if mode == Mode::Flat && !self.remeasure {
                        if *should_break {
                            Mode::Break
                        } else {
                            Mode::Flat
                        }
                    } else {
                        self.remeasure = false;
                        let flat = Cmd {
                            indent,
                            mode: Mode::Flat,
                            item: Item::Doc(contents),
                        };
                        if !*should_break && self.fits(flat, &cmds, false) {
                            Mode::Flat
                        } else {
                            Mode::Break
                        }
                    };
                    cmds.push(Cmd {
                        indent,
                        mode: group_mode,
                        item: Item::Doc(contents),
                    });
                    if let Some(id) = id {
                        self.group_modes.insert(*id, group_mode);
                    }
                }
                Doc::IfBreak {
                    group_id,
                    broken,
                    flat,
                } => {
                    let contents = if self.mode_of(*group_id, mode) == Mode::Break {
                        broken
                    } else {
                        flat
                    };
                    cmds.push(Cmd {
                        indent,
                        mode,
                        item: Item::Doc(contents),
                    });
                }
                Doc::Line(kind) => match (mode, kind) {
                    (Mode::Flat, LineKind::Soft) => {}
                    (Mode::Flat, LineKind::Normal) => {
                        self.out.push(' ');
                        self.pos += 1;
                    }
                    (Mode::Flat, LineKind::Hard | LineKind::Literal) => {
                        self.remeasure = true;
                        self.newline(indent, *kind == LineKind::Literal);
                    }
                    (Mode::Break, _) => self.newline(indent, *kind == LineKind::Literal),
                },
                Doc::BreakParent => {}
            }
        }
    }

    /// Mode of the group named `group_id`; groups not printed yet count as flat.
    fn mode_of(&self, group_id: Option<GroupId>, current: Mode) -> Mode {
        match group_id {
            Some(id) => self.group_modes.get(&id).copied().unwrap_or(Mode::Flat),
            None => current,
        }
    }

    /// Whether `next` fits in the rest of the line. The commands still on the
    /// stack are measured too, up to their first possible line break.
    fn fits(&self, next: Cmd<'_>, rest: &[Cmd<'_>], must_be_flat: bool) -> bool {
        let mut remaining = self.options.print_width as isize - self.pos as isize;
        let mut rest_idx = rest.len();
        let mut cmds = vec![(next.mode, next.item)];

        while remaining >= 0 {
            let Some((mode, item)) = cmds.pop() else {
                if rest_idx == 0 {
                    return true;
                }
                rest_idx -= 1;
                cmds.push((rest[rest_idx].mode, rest[rest_idx].item));
                continue;
            };

            let doc = match item {
                Item::Doc(doc) => doc,
                Item::Concat(parts) | Item::Fill(parts) => {
                    cmds.extend(parts.iter().rev().map(|part| (mode, Item::Doc(part))));
                    continue;
                }
            };

            match doc {
                Doc::Text(s) => remaining -= width(s) as isize,
                Doc::Concat(parts) | Doc::Fill(parts) => {
                    cmds.extend(parts.iter().rev().map(|part| (mode, Item::Doc(part))));
                }
                Doc::Indent(contents) => cmds.push((mode, Item::Doc(contents))),
                Doc::Group {
                    contents,
                    should_break,
                    ..
                } => {
                    if must_be_flat && *should_break {
                        return false;
                    }
                    let group_mode = if *should_break { Mode::Break } else { mode };
                    cmds.push((group_mode, Item::Doc(contents)));
                }
                Doc::IfBreak {
                    group_id,
                    broken,
                    flat,
                } => {
                    let contents = if self.mode_of(*group_id, mode) == Mode::Break {
                        broken
                    } else {
                        flat
                    };
                    cmds.push((mode, Item::Doc(contents)));
                }
                Doc::Line(kind) => {
                    if mode == Mode::Break || matches!(kind, LineKind::Hard | LineKind::Literal) {
                        return true;
                    }
                    if *kind == LineKind::Normal {
                        remaining -= 1;
                    }
                }
                Doc::BreakParent => {}
            }
        }
        false
    }

    /// Packs `[content, separator, content, ...]`: each separator breaks only
    /// when the content after it would not fit.
    fn fill<'d>(&mut self, cmds: &mut Vec<Cmd<'d>>, indent: usize, mode: Mode, parts: &'d [Doc]) {
        let cmd = |mode, item| Cmd { indent, mode, item };
        let Some((content, rest)) = parts.split_first() else {
            return;
        };
        let content_fits = self.fits(cmd(Mode::Flat, Item::Doc(content)), &[], true);

        let Some((separator, rest)) = rest.split_first() else {
            let content_mode = if content_fits { Mode::Flat } else { Mode::Break };
            cmds.push(cmd(content_mode, Item::Doc(content)));
            return;
        };

        if rest.is_empty() {
            let both = if content_fits { Mode::Flat } else { Mode::Break };
            cmds.push(cmd(both, Item::Doc(separator)));
            cmds.push(cmd(both, Item::Doc(content)));
            return;
        }

        let pair_fits = self.fits(cmd(Mode::Flat, Item::Concat(&parts[..3])), &[], true);
        cmds.push(cmd(mode, Item::Fill(rest)));
        if pair_fits {
            cmds.push(cmd(Mode::Flat, Item::Doc(separator)));
            cmds.push(cmd(Mode::Flat, Item::Doc(content)));
        } else if content_fits {
            cmds.push(cmd(Mode::Break, Item::Doc(separator)));
            cmds.push(cmd(Mode::Flat, Item::Doc(content)));
        } else {
            cmds.push(cmd(Mode::Break, Item::Doc(separator)));
            cmds.push(cmd(Mode::Break, Item::Doc(content)));
        }
    }

    fn newline(&mut self, indent: usize, literal: bool) {
        if literal {
            self.out.push('\n');
            self.pos = 0;
            return;
        }
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        if self.options.use_tabs {
            self.out.extend(std::iter::repeat('\t').take(indent));
        } else {
            self.out
                .extend(std::iter::repeat(' ').take(indent * self.options.indent_width));
        }
        self.pos = indent * self.options.indent_width;
    }
}

fn push_parts<'d>(cmds: &mut Vec<Cmd<'d>>, indent: usize, mode: Mode, parts: &'d [Doc]) {
    cmds.extend(parts.iter().rev().map(|part| Cmd {
        indent,
        mode,
        item: Item::Doc(part),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_at(doc: Doc, print_width: usize) -> String {
        let options = FormatOptions {
            print_width,
            ..FormatOptions::default()
        };
        render(doc, &options)
    }

    fn words(list: &[&str]) -> Doc {
        join(line(), list.iter().map(|w| text(*w)).collect())
    }

    #[test]
    fn group_stays_flat_when_it_fits() {
        assert_eq!(render_at(group(words(&["a", "b"])), 3), "a b");
        assert_eq!(render_at(group(words(&["a", "b"])), 2), "a\nb");
    }

    #[test]
    fn soft_lines_vanish_when_flat() {
        let doc = group(concat(vec![text("<b>"), softline(), text("x"), softline(), text("</b>")]));
        assert_eq!(render_at(doc.clone(), 80), "<b>x</b>");
        assert_eq!(render_at(doc, 4), "<b>\nx\n</b>");
    }

    #[test]
    fn hard_lines_break_enclosing_groups() {
        let doc = group(concat(vec![
            text("<div>"),
            indent(concat(vec![softline(), text("a"), hardline(), text("b")])),
            softline(),
            text("</div>"),
        ]));
        assert_eq!(render_at(doc, 80), "<div>\n  a\n  b\n</div>");
    }

    #[test]
    fn if_break_follows_the_named_group() {
        let mut ids = GroupIds::default();
        let first = ids.issue();
        let doc = concat(vec![
            group_with_id(first, concat(vec![text("aaaa"), softline(), text("bbbb")])),
            if_break(text("|broken"), text("|flat"), Some(first)),
        ]);
        assert_eq!(render_at(doc.clone(), 80), "aaaabbbb|flat");
        assert_eq!(render_at(doc, 6), "aaaa\nbbbb|broken");
    }

    #[test]
    fn if_break_before_its_group_is_printed_reads_flat() {
        let mut ids = GroupIds::default();
        let later = ids.issue();
        let doc = concat(vec![
            if_break(text("B"), text("F"), Some(later)),
            group_with_id(later, concat(vec![text("x"), hardline(), text("y")])),
        ]);
        assert_eq!(render_at(doc, 80), "Fx\ny");
    }

    #[test]
    fn fill_packs_words() {
        let doc = fill(vec![
            text("one"),
            line(),
            text("two"),
            line(),
            text("three"),
            line(),
            text("four"),
        ]);
        assert_eq!(render_at(doc, 9), "one two\nthree\nfour");
    }

    #[test]
    fn verbatim_keeps_lines_and_skips_indentation() {
        let doc = concat(vec![
            text("<pre>"),
            indent(concat(vec![hardline(), verbatim("a  \n   b")])),
            text("</pre>"),
        ]);
        assert_eq!(render_at(doc, 80), "<pre>\n  a  \n   b</pre>");
    }

    #[test]
    fn trailing_blanks_are_trimmed_before_newlines() {
        let doc = concat(vec![text("a "), hardline(), text("b")]);
        assert_eq!(render_at(doc, 80), "a\nb");
    }

    #[test]
    fn tabs_indent_when_requested() {
        let options = FormatOptions {
            use_tabs: true,
            ..FormatOptions::default()
        };
        let doc = concat(vec![text("a"), indent(concat(vec![hardline(), text("b")]))]);
        assert_eq!(render(doc, &options), "a\n\tb");
    }

    #[test]
    fn rest_of_line_counts_toward_fitting() {
        let doc = concat(vec![group(words(&["a", "b"])), text("cccc")]);
        assert_eq!(render_at(doc.clone(), 7), "a bcccc");
        assert_eq!(render_at(doc, 6), "a\nbcccc");
    }

    #[test]
    fn empty_docs() {
        assert!(nil().is_empty());
        assert!(concat(vec![text(""), nil()]).is_empty());
        assert!(!softline().is_empty());
        assert_eq!(render_at(nil(), 80), "");
    }
}
