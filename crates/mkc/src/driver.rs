//! Pass orchestration.
//!
//! Threads the pipeline over the resolved module graph: lexical and
//! structural errors gate semantic passes for the affected module only,
//! modules are checked in topological order so dependency exports seed
//! importers, and every diagnostic from every pass lands in one sorted
//! list. Emission runs only when that list is empty.

use mk_common::diag::{sort_diagnostics, Diagnostic, ErrorCode};
use mk_common::module_graph::topological_sort;
use mk_common::span::{LineIndex, Span};
use mk_typeck::{ImportContext, TypeckResult};

use crate::resolver::{LoadedModule, Resolution};

/// A diagnostic still carrying its byte span, before line/column
/// rendering.
#[derive(Debug, Clone)]
pub struct FileDiagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub file: String,
    pub span: Span,
}

impl FileDiagnostic {
    fn render(&self, line_indexes: &[(String, LineIndex)]) -> Diagnostic {
        let (line, column) = line_indexes
            .iter()
            .find(|(file, _)| *file == self.file)
            .map(|(_, index)| index.line_col(self.span.start))
            .unwrap_or((1, 1));
        Diagnostic::new(self.code, self.message.clone(), self.file.clone(), line, column)
    }
}

/// The result of running every analysis pass over a resolved program.
pub struct CheckedProgram {
    /// Sorted, rendered diagnostics from every pass.
    pub diagnostics: Vec<Diagnostic>,
    /// Span-level diagnostics per file, for verbose rendering.
    pub file_diagnostics: Vec<FileDiagnostic>,
    /// The entry module's checking result, when its parse succeeded.
    pub entry_typeck: Option<TypeckResult>,
}

/// Run semantic analysis over a resolution, in dependency order.
pub fn check_program(resolution: &Resolution) -> CheckedProgram {
    let mut file_diagnostics: Vec<FileDiagnostic> = resolution.diagnostics.clone();

    // Topological order; on the (already reported) cycle case fall back
    // to load order so independent modules still get checked.
    let order = topological_sort(&resolution.graph)
        .map(|ids| ids.into_iter().map(|id| id.0 as usize).collect::<Vec<_>>())
        .unwrap_or_else(|_| (0..resolution.modules.len()).collect());

    let mut imports = ImportContext::empty();
    let mut entry_typeck = None;

    for index in order {
        let module = &resolution.modules[index];

        // Parse errors gate semantic passes for this module only.
        if !module.parse.errors().is_empty() {
            for error in module.parse.errors() {
                file_diagnostics.push(FileDiagnostic {
                    code: error.code,
                    message: error.message.clone(),
                    file: module.display_path.clone(),
                    span: error.span,
                });
            }
            continue;
        }

        let typeck = mk_typeck::check_with_imports(&module.parse, &imports);
        for error in &typeck.errors {
            let range = error.span();
            file_diagnostics.push(FileDiagnostic {
                code: error.code(),
                message: error.to_string(),
                file: module.display_path.clone(),
                span: Span::new(range.start().into(), range.end().into()),
            });
        }

        register_exports(&mut imports, module, &typeck);
        if resolution.graph.get(module.id).is_entry {
            entry_typeck = Some(typeck);
        }
    }

    let line_indexes: Vec<(String, LineIndex)> = resolution
        .modules
        .iter()
        .map(|m| (m.display_path.clone(), LineIndex::new(&m.source)))
        .collect();

    let mut diagnostics: Vec<Diagnostic> = file_diagnostics
        .iter()
        .map(|d| d.render(&line_indexes))
        .collect();
    sort_diagnostics(&mut diagnostics);

    CheckedProgram {
        diagnostics,
        file_diagnostics,
        entry_typeck,
    }
}

/// Make a checked module's exports visible to later modules.
///
/// The export group matching the module's resolved name wins; a file
/// without a matching `module` block exports its loose declarations.
fn register_exports(imports: &mut ImportContext, module: &LoadedModule, typeck: &TypeckResult) {
    let mut chosen = None;
    for (path, exports) in &typeck.module_exports {
        match path {
            Some(path) if *path == module.name => {
                chosen = Some(exports.clone());
                break;
            }
            None if chosen.is_none() => {
                chosen = Some(exports.clone());
            }
            _ => {}
        }
    }
    if let Some(mut exports) = chosen {
        exports.module_name = module.name.clone();
        imports.modules.insert(module.name.clone(), exports);
    }

    // Module blocks other than the file's own name are importable under
    // their declared names as well.
    for (path, exports) in &typeck.module_exports {
        if let Some(path) = path {
            if *path != module.name && !imports.modules.contains_key(path) {
                imports.modules.insert(path.clone(), exports.clone());
            }
        }
    }
}
