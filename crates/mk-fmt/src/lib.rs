//! Manaknight code formatter.
//!
//! Implements the canonical formatter using the Wadler-Lindig document IR
//! approach:
//!
//! 1. Parse source to a CST (via `mk-parser`)
//! 2. Walk the CST to produce a `FormatIR` document tree
//! 3. Print the IR, respecting line-width constraints
//!
//! The formatter is purely cosmetic: re-parsing its output yields the
//! identical AST, and formatting twice equals formatting once.

pub mod ir;
pub mod printer;
pub mod walker;

pub use printer::FormatConfig;

/// Format Manaknight source code according to the given configuration.
///
/// Comments are preserved; those buried inside a construct move onto
/// their own lines in front of the enclosing statement.
pub fn format_source(source: &str, config: &FormatConfig) -> String {
    let parse = mk_parser::parse(source);
    let file = parse.source_file();
    let doc = walker::walk_file(&file);
    printer::print(&doc, config)
}
