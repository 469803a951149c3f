//! Wadler-Lindig printer for the Manaknight format IR.
//!
//! Converts a `FormatIR` tree into a formatted string by deciding at each
//! `Group` boundary whether to render flat (all on one line) or broken
//! (with line breaks and indentation).

use crate::ir::FormatIR;

/// Configuration for the formatter output.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Number of spaces per indentation level. Default: 4.
    pub indent_size: usize,
    /// Maximum line width before groups break. Default: 100.
    pub max_width: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            max_width: 100,
        }
    }
}

/// Whether the current context is rendering flat or broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Everything on one line; `Space` renders as " ".
    Flat,
    /// Line breaks at `Space` positions.
    Break,
}

/// A command on the printer's work stack.
#[derive(Debug)]
struct PrintCmd<'a> {
    indent: usize,
    mode: Mode,
    ir: &'a FormatIR,
}

/// Render a `FormatIR` tree as a formatted string respecting the config.
///
/// The algorithm is stack-based: at each `Group`, it measures whether the
/// flat rendering fits on the remaining line; if so, the group renders
/// flat, otherwise in broken mode. Output always ends with exactly one
/// trailing newline.
pub fn print(ir: &FormatIR, config: &FormatConfig) -> String {
    let mut out = String::new();
    let mut col: usize = 0;
    let mut stack: Vec<PrintCmd> = vec![PrintCmd {
        indent: 0,
        mode: Mode::Break,
        ir,
    }];

    while let Some(cmd) = stack.pop() {
        match cmd.ir {
            FormatIR::Empty => {}

            FormatIR::Text(s) => {
                out.push_str(s);
                col += s.len();
            }

            FormatIR::Space => match cmd.mode {
                Mode::Flat => {
                    out.push(' ');
                    col += 1;
                }
                Mode::Break => {
                    out.push('\n');
                    out.push_str(&" ".repeat(cmd.indent));
                    col = cmd.indent;
                }
            },

            FormatIR::Hardline => {
                out.push('\n');
                out.push_str(&" ".repeat(cmd.indent));
                col = cmd.indent;
            }

            FormatIR::Indent(child) => {
                stack.push(PrintCmd {
                    indent: cmd.indent + config.indent_size,
                    mode: cmd.mode,
                    ir: child,
                });
            }

            FormatIR::Group(child) => {
                let flat_width = measure_flat(child);
                let mode = if col.saturating_add(flat_width) <= config.max_width {
                    Mode::Flat
                } else {
                    Mode::Break
                };
                stack.push(PrintCmd {
                    indent: cmd.indent,
                    mode,
                    ir: child,
                });
            }

            FormatIR::IfBreak { flat, broken } => {
                let ir = match cmd.mode {
                    Mode::Flat => flat,
                    Mode::Break => broken,
                };
                stack.push(PrintCmd {
                    indent: cmd.indent,
                    mode: cmd.mode,
                    ir,
                });
            }

            FormatIR::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(PrintCmd {
                        indent: cmd.indent,
                        mode: cmd.mode,
                        ir: part,
                    });
                }
            }
        }
    }

    // No trailing whitespace on any line (blank lines between indented
    // items would otherwise keep their indent), and exactly one trailing
    // newline.
    let mut out: String = out
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}

/// Measure the width of an IR node rendered flat.
///
/// Returns `usize::MAX` for anything containing a `Hardline`, which can
/// never fit on one line.
fn measure_flat(ir: &FormatIR) -> usize {
    match ir {
        FormatIR::Empty => 0,
        FormatIR::Text(s) => s.len(),
        FormatIR::Space => 1,
        FormatIR::Hardline => usize::MAX,
        FormatIR::Indent(child) => measure_flat(child),
        FormatIR::Group(child) => measure_flat(child),
        FormatIR::IfBreak { flat, .. } => measure_flat(flat),
        FormatIR::Concat(parts) => {
            let mut total: usize = 0;
            for part in parts {
                let w = measure_flat(part);
                if w == usize::MAX {
                    return usize::MAX;
                }
                total = total.saturating_add(w);
            }
            total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    #[test]
    fn group_fits_renders_flat() {
        let ir = group(concat(vec![text("a"), space(), text("b")]));
        assert_eq!(print(&ir, &FormatConfig::default()), "a b\n");
    }

    #[test]
    fn group_exceeds_width_breaks() {
        let config = FormatConfig {
            indent_size: 4,
            max_width: 10,
        };
        let ir = group(concat(vec![
            text("hello"),
            space(),
            text("beautiful"),
            space(),
            text("world"),
        ]));
        assert_eq!(print(&ir, &config), "hello\nbeautiful\nworld\n");
    }

    #[test]
    fn indent_applies_after_hardline() {
        let ir = concat(vec![
            text("{"),
            indent(concat(vec![hardline(), text("x")])),
            hardline(),
            text("}"),
        ]);
        assert_eq!(print(&ir, &FormatConfig::default()), "{\n    x\n}\n");
    }

    #[test]
    fn output_ends_with_single_newline() {
        let ir = concat(vec![text("a"), hardline(), hardline()]);
        assert_eq!(print(&ir, &FormatConfig::default()), "a\n");
    }
}
