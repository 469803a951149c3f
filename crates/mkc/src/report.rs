//! Diagnostic rendering for the CLI.
//!
//! The default surface prints the stable one-line form
//! `Error E####: <message> at <file>:<line>:<column>`; verbose mode adds
//! an ariadne source report per diagnostic. Internal-category errors are
//! never shown verbatim outside debug builds.

use ariadne::{Config, Label, Report, ReportKind, Source};

use mk_common::diag::{Category, Diagnostic};

use crate::driver::FileDiagnostic;

/// The stable one-line rendering.
pub fn render_plain(diagnostic: &Diagnostic) -> String {
    if diagnostic.category == Category::Internal && !cfg!(debug_assertions) {
        // Production builds surface internal errors generically so no
        // implementation detail leaks.
        return format!(
            "Error {}: internal compiler error at {}:{}:{}",
            diagnostic.code, diagnostic.file, diagnostic.line, diagnostic.column
        );
    }
    diagnostic.to_string()
}

/// A labeled source report for verbose mode.
pub fn render_verbose(diagnostic: &FileDiagnostic, source: &str) -> String {
    let source_len = source.len();
    let start = (diagnostic.span.start as usize).min(source_len);
    let end = (diagnostic.span.end as usize)
        .min(source_len)
        .max(start);
    let range = if start == end {
        start..end.saturating_add(1).min(source_len).max(start)
    } else {
        start..end
    };

    let report = Report::build(ReportKind::Error, range.clone())
        .with_config(Config::default().with_color(false))
        .with_code(diagnostic.code.to_string())
        .with_message(&diagnostic.message)
        .with_label(Label::new(range).with_message(&diagnostic.message))
        .finish();

    let mut buffer = Vec::new();
    match report.write(Source::from(source), &mut buffer) {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(_) => format!("{}: {}\n", diagnostic.code, diagnostic.message),
    }
}
