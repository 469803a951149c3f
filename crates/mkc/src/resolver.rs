//! Module resolution: mapping dotted module names to files, recursive
//! loading with caching, duplicate detection, and cycle rejection.
//!
//! Resolution is strictly static: `a.b.c` maps to `<root>/a/b/c.mk`
//! relative to the compilation root (the entry file's directory). There
//! is no search path. Each file is read, lexed, and parsed exactly once;
//! subsequent references hit the cache. Dependency edges are checked with
//! a depth-first search before they are admitted, so the graph is a DAG
//! at all times.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use mk_common::diag::codes;
use mk_common::module_graph::{ModuleGraph, ModuleId};
use mk_common::span::Span;
use mk_parser::ast::item::Item;
use mk_parser::ast::AstNode;
use mk_parser::Parse;

use crate::driver::FileDiagnostic;

/// A loaded, parsed module awaiting semantic analysis.
pub struct LoadedModule {
    pub id: ModuleId,
    /// Dotted module name (the entry file's stem for the entry module).
    pub name: String,
    /// Path shown in diagnostics, relative to the compilation root.
    pub display_path: String,
    pub source: String,
    pub parse: Parse,
}

/// The outcome of resolving the transitive import closure of one entry
/// file.
pub struct Resolution {
    /// Modules in load order. Index matches `ModuleId` assignment.
    pub modules: Vec<LoadedModule>,
    pub graph: ModuleGraph,
    /// Resolution-phase diagnostics (missing files, duplicates, cycles).
    pub diagnostics: Vec<FileDiagnostic>,
}

/// Resolve the entry file and everything it transitively imports.
pub fn resolve(entry: &Path) -> Result<Resolution, String> {
    let root = entry
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let entry_name = entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main")
        .to_string();

    let source = std::fs::read_to_string(entry)
        .map_err(|e| format!("cannot read '{}': {e}", entry.display()))?;

    let mut resolver = Resolver {
        root,
        modules: Vec::new(),
        graph: ModuleGraph::new(),
        by_name: FxHashMap::default(),
        declared_blocks: FxHashMap::default(),
        diagnostics: Vec::new(),
    };

    let display = entry
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("main.mk")
        .to_string();
    let entry_id = resolver.register(entry_name, display, source, true);
    resolver.load_imports(entry_id);

    Ok(Resolution {
        modules: resolver.modules,
        graph: resolver.graph,
        diagnostics: resolver.diagnostics,
    })
}

struct Resolver {
    root: PathBuf,
    modules: Vec<LoadedModule>,
    graph: ModuleGraph,
    /// Cache: module name -> id.
    by_name: FxHashMap<String, ModuleId>,
    /// `module x.y { .. }` block names seen so far -> declaring file.
    declared_blocks: FxHashMap<String, String>,
    diagnostics: Vec<FileDiagnostic>,
}

impl Resolver {
    /// Parse and register a module, returning its id.
    fn register(
        &mut self,
        name: String,
        display_path: String,
        source: String,
        is_entry: bool,
    ) -> ModuleId {
        let parse = mk_parser::parse(&source);
        let id = self
            .graph
            .add_module(name.clone(), PathBuf::from(&display_path), is_entry);
        self.by_name.insert(name.clone(), id);
        self.check_module_blocks(&parse, &display_path, &name);
        self.modules.push(LoadedModule {
            id,
            name,
            display_path,
            source,
            parse,
        });
        id
    }

    /// A `module a.b { .. }` block defines that module; the same name
    /// defined by a second location is E5002.
    fn check_module_blocks(&mut self, parse: &Parse, display_path: &str, file_module: &str) {
        for item in parse.source_file().items() {
            let Item::Module(module) = item else { continue };
            let Some(path) = module.path() else { continue };
            let block_name = path.text();
            let span = to_span(path.syntax().text_range());
            if let Some(previous) = self.declared_blocks.get(&block_name) {
                self.diagnostics.push(FileDiagnostic {
                    code: codes::DUPLICATE_MODULE,
                    message: format!(
                        "module `{block_name}` is already defined in `{previous}`"
                    ),
                    file: display_path.to_string(),
                    span,
                });
                continue;
            }
            if block_name != file_module && self.by_name.contains_key(&block_name) {
                self.diagnostics.push(FileDiagnostic {
                    code: codes::DUPLICATE_MODULE,
                    message: format!("module `{block_name}` is defined twice"),
                    file: display_path.to_string(),
                    span,
                });
                continue;
            }
            self.declared_blocks
                .insert(block_name, display_path.to_string());
        }
    }

    /// Load everything `importer` imports, depth-first.
    fn load_imports(&mut self, importer: ModuleId) {
        let imports = self.imports_of(importer);
        let importer_file = self.modules[importer.0 as usize].display_path.clone();

        for (name, span) in imports {
            let imported = match self.by_name.get(&name) {
                Some(id) => *id,
                None => match self.load_file(&name, &importer_file, span) {
                    Some(id) => {
                        self.load_imports(id);
                        id
                    }
                    None => continue,
                },
            };

            if let Err(cycle) = self.graph.add_dependency(importer, imported) {
                self.diagnostics.push(FileDiagnostic {
                    code: codes::CIRCULAR_IMPORT,
                    message: format!("circular module dependency: {cycle}"),
                    file: importer_file.clone(),
                    span,
                });
            }
        }
    }

    /// The dotted import paths of a module, with their spans.
    fn imports_of(&self, id: ModuleId) -> Vec<(String, Span)> {
        let parse = &self.modules[id.0 as usize].parse;
        let mut imports = Vec::new();
        for item in parse.source_file().items() {
            match item {
                Item::Import(import) => push_import(&import, &mut imports),
                Item::Module(module) => {
                    for inner in module.items() {
                        if let Item::Import(import) = inner {
                            push_import(&import, &mut imports);
                        }
                    }
                }
                _ => {}
            }
        }
        imports
    }

    /// Read and register the file backing a module name, or report E5001.
    fn load_file(&mut self, name: &str, importer_file: &str, span: Span) -> Option<ModuleId> {
        let relative: PathBuf = name.split('.').collect::<PathBuf>().with_extension("mk");
        let path = self.root.join(&relative);
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(_) => {
                self.diagnostics.push(FileDiagnostic {
                    code: codes::MODULE_NOT_FOUND,
                    message: format!(
                        "module `{name}` not found (expected `{}`)",
                        relative.display()
                    ),
                    file: importer_file.to_string(),
                    span,
                });
                return None;
            }
        };
        let display = relative.to_string_lossy().replace('\\', "/");
        Some(self.register(name.to_string(), display, source, false))
    }
}

fn push_import(import: &mk_parser::ast::item::ImportDecl, out: &mut Vec<(String, Span)>) {
    if let Some(path) = import.path() {
        let span = to_span(path.syntax().text_range());
        out.push((path.text(), span));
    }
}

fn to_span(range: rowan::TextRange) -> Span {
    Span::new(range.start().into(), range.end().into())
}
