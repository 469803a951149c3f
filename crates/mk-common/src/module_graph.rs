//! Module graph types for the Manaknight compiler.
//!
//! Provides the data structures shared by the module resolver and the
//! driver: [`ModuleId`], [`ModuleInfo`], [`ModuleGraph`], and
//! [`CycleError`]. The graph must stay a DAG; edges are checked with a
//! depth-first search before they are admitted.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

/// A unique identifier for a module within a compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

/// Metadata about a single module in the module graph.
#[derive(Debug)]
pub struct ModuleInfo {
    /// Unique identifier for this module.
    pub id: ModuleId,
    /// Dotted lowercase module name, e.g. `"util.strings"`.
    pub name: String,
    /// Path relative to the compilation root, e.g. `"util/strings.mk"`.
    pub path: PathBuf,
    /// Modules that this module depends on (via `import` declarations).
    pub dependencies: Vec<ModuleId>,
    /// Names exported by this module (its `pub` declarations), in source order.
    pub exports: Vec<String>,
    /// Whether this module is the compilation entry point.
    pub is_entry: bool,
}

/// Error returned when a dependency edge would close a cycle.
#[derive(Debug, Clone)]
pub struct CycleError {
    /// The module names forming the cycle, e.g. `["a", "b", "c", "a"]`.
    pub cycle_path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cycle_path.join(" -> "))
    }
}

/// A directed graph of modules and their dependencies.
///
/// Modules are stored in insertion order and identified by [`ModuleId`].
/// Name-based lookup is provided via an internal hash map.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    /// All modules in the graph, indexed by `ModuleId.0`.
    pub modules: Vec<ModuleInfo>,
    /// Maps dotted module names to their [`ModuleId`].
    name_to_id: FxHashMap<String, ModuleId>,
}

impl ModuleGraph {
    /// Create an empty module graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the graph and return its assigned [`ModuleId`].
    ///
    /// The ID is assigned sequentially starting from 0.
    pub fn add_module(&mut self, name: String, path: PathBuf, is_entry: bool) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.name_to_id.insert(name.clone(), id);
        self.modules.push(ModuleInfo {
            id,
            name,
            path,
            dependencies: Vec::new(),
            exports: Vec::new(),
            is_entry,
        });
        id
    }

    /// Look up a module by its dotted name.
    pub fn resolve(&self, name: &str) -> Option<ModuleId> {
        self.name_to_id.get(name).copied()
    }

    /// Record that module `from` depends on module `to`.
    ///
    /// The edge is rejected with a [`CycleError`] when `to` can already
    /// reach `from` (a depth-first search along existing edges), so the
    /// graph is a DAG at every point in time. A self-edge is the trivial
    /// cycle. Duplicate edges are ignored.
    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) -> Result<(), CycleError> {
        if from == to {
            let name = self.modules[from.0 as usize].name.clone();
            return Err(CycleError {
                cycle_path: vec![name.clone(), name],
            });
        }
        if let Some(mut path) = self.find_path(to, from) {
            // to -> ... -> from, plus the new edge from -> to, is a cycle.
            path.push(self.modules[to.0 as usize].name.clone());
            return Err(CycleError { cycle_path: path });
        }
        let deps = &mut self.modules[from.0 as usize].dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
        Ok(())
    }

    /// Record the export list for a module.
    pub fn set_exports(&mut self, id: ModuleId, exports: Vec<String>) {
        self.modules[id.0 as usize].exports = exports;
    }

    /// Return the number of modules in the graph.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Get a reference to a module by its [`ModuleId`].
    pub fn get(&self, id: ModuleId) -> &ModuleInfo {
        &self.modules[id.0 as usize]
    }

    /// Depth-first search for a dependency path from `start` to `goal`.
    ///
    /// Returns the module names along the path (start first), or `None`
    /// when `goal` is unreachable. Gray/black marking via the `visited`
    /// set keeps the walk linear.
    fn find_path(&self, start: ModuleId, goal: ModuleId) -> Option<Vec<String>> {
        let mut visited = vec![false; self.modules.len()];
        let mut path = Vec::new();
        if self.dfs(start, goal, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs(
        &self,
        current: ModuleId,
        goal: ModuleId,
        visited: &mut [bool],
        path: &mut Vec<String>,
    ) -> bool {
        if visited[current.0 as usize] {
            return false;
        }
        visited[current.0 as usize] = true;
        path.push(self.modules[current.0 as usize].name.clone());
        if current == goal {
            return true;
        }
        for dep in &self.modules[current.0 as usize].dependencies {
            if self.dfs(*dep, goal, visited, path) {
                return true;
            }
        }
        path.pop();
        false
    }
}

/// Topological sort of the module graph using Kahn's algorithm.
///
/// Returns modules in dependency order: leaf modules (no dependencies)
/// first, the entry module last. Alphabetical tie-breaking keeps the order
/// deterministic. Returns `Err(CycleError)` if the graph somehow contains
/// a cycle (it cannot when edges were admitted via `add_dependency`).
pub fn topological_sort(graph: &ModuleGraph) -> Result<Vec<ModuleId>, CycleError> {
    let n = graph.modules.len();
    let mut in_degree: Vec<u32> = graph
        .modules
        .iter()
        .map(|m| m.dependencies.len() as u32)
        .collect();

    let mut ready: Vec<ModuleId> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(|i| ModuleId(i as u32))
        .collect();
    ready.sort_by(|a, b| graph.get(*a).name.cmp(&graph.get(*b).name));

    let mut queue = VecDeque::from(ready);
    let mut order = Vec::with_capacity(n);

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let mut newly_ready = Vec::new();
        for (i, module) in graph.modules.iter().enumerate() {
            if in_degree[i] > 0 && module.dependencies.contains(&id) {
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    newly_ready.push(ModuleId(i as u32));
                }
            }
        }
        newly_ready.sort_by(|a, b| graph.get(*a).name.cmp(&graph.get(*b).name));
        queue.extend(newly_ready);
    }

    if order.len() == n {
        Ok(order)
    } else {
        // Unreached modules are on a cycle; surface the first one found.
        let stuck = (0..n).find(|&i| in_degree[i] > 0).unwrap_or(0);
        Err(CycleError {
            cycle_path: vec![graph.modules[stuck].name.clone()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_resolve() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("util.strings".into(), "util/strings.mk".into(), false);
        let b = graph.add_module("app".into(), "app.mk".into(), true);

        assert_eq!(graph.resolve("util.strings"), Some(a));
        assert_eq!(graph.resolve("app"), Some(b));
        assert_eq!(graph.resolve("nope"), None);
        assert_eq!(graph.module_count(), 2);
        assert!(graph.get(b).is_entry);
    }

    #[test]
    fn add_dependency_rejects_self_cycle() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a".into(), "a.mk".into(), false);
        let err = graph.add_dependency(a, a).unwrap_err();
        assert_eq!(err.cycle_path, vec!["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn add_dependency_rejects_two_step_cycle() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a".into(), "a.mk".into(), false);
        let b = graph.add_module("b".into(), "b.mk".into(), false);
        graph.add_dependency(a, b).unwrap();
        let err = graph.add_dependency(b, a).unwrap_err();
        // b -> a exists as a path a <- b; the reported cycle runs a -> b -> a.
        assert_eq!(err.cycle_path.first(), err.cycle_path.last());
        assert!(err.cycle_path.contains(&"b".to_string()));
    }

    #[test]
    fn add_dependency_allows_diamond() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a".into(), "a.mk".into(), false);
        let b = graph.add_module("b".into(), "b.mk".into(), false);
        let c = graph.add_module("c".into(), "c.mk".into(), false);
        let d = graph.add_module("d".into(), "d.mk".into(), false);
        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(a, c).unwrap();
        graph.add_dependency(b, d).unwrap();
        graph.add_dependency(c, d).unwrap();
    }

    #[test]
    fn toposort_linear() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a".into(), "a.mk".into(), false);
        let b = graph.add_module("b".into(), "b.mk".into(), false);
        let c = graph.add_module("c".into(), "c.mk".into(), false);
        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(b, c).unwrap();

        let order = topological_sort(&graph).unwrap();
        let names: Vec<&str> = order.iter().map(|id| graph.get(*id).name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn toposort_independent_is_alphabetical() {
        let mut graph = ModuleGraph::new();
        graph.add_module("c".into(), "c.mk".into(), false);
        graph.add_module("a".into(), "a.mk".into(), false);
        graph.add_module("b".into(), "b.mk".into(), false);

        let order = topological_sort(&graph).unwrap();
        let names: Vec<&str> = order.iter().map(|id| graph.get(*id).name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn toposort_entry_last() {
        let mut graph = ModuleGraph::new();
        let main = graph.add_module("main".into(), "main.mk".into(), true);
        let util = graph.add_module("util".into(), "util.mk".into(), false);
        let math = graph.add_module("math".into(), "math.mk".into(), false);
        graph.add_dependency(main, util).unwrap();
        graph.add_dependency(main, math).unwrap();

        let order = topological_sort(&graph).unwrap();
        let names: Vec<&str> = order.iter().map(|id| graph.get(*id).name.as_str()).collect();
        assert_eq!(names, vec!["math", "util", "main"]);
    }

    #[test]
    fn exports_recorded() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a".into(), "a.mk".into(), false);
        graph.set_exports(a, vec!["helper".into(), "Thing".into()]);
        assert_eq!(graph.get(a).exports, vec!["helper", "Thing"]);
    }
}
