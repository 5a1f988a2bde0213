// src/lib.rs
//
// reformaliquid: HTML + Liquid formatter core.
//
// source -> parse -> classify (display, white-space) -> whitespace
// sensitivity -> printer (Doc) -> render.

pub mod ast;
pub mod config;
pub mod css;
pub mod doc;
pub mod error;
pub mod facts;
pub mod parse;
pub mod printer;
pub mod visit;
pub mod whitespace;

use log::debug;

pub use config::{FormatOptions, WhitespaceSensitivity};
pub use error::FormatError;

use facts::SourceFacts;
use printer::Printer;

/// Formats `source` and returns the printed document.
pub fn format(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let mut tree = parse::parse(source)?;
    css::classify_tree(&mut tree, options.whitespace_sensitivity);
    whitespace::compute_sensitivity(&mut tree);

    debug!(
        target: "reformaliquid",
        "{} nodes, print width {}, {:?} whitespace",
        tree.len(),
        options.print_width,
        options.whitespace_sensitivity
    );

    let facts = SourceFacts::new(&tree);
    let doc = Printer::new(&facts).print_document()?;
    Ok(doc::render(doc, options))
}
