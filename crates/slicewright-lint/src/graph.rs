//! Import graph extraction.
//!
//! Scans a generated source tree, pulls every import declaration out of
//! every module, and records the edges in a petgraph arena with each
//! endpoint tagged by its owning domain. No validation happens here; the
//! graph is input for the linter.

use std::collections::HashMap;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use tracing::debug;

use slicewright_common_core::Result;
use slicewright_common_fs as fs;

use crate::registry::{DomainRegistry, DomainTag};

/// Largest module source the scanner will read.
const MAX_MODULE_SIZE: usize = 4 * 1024 * 1024;

/// A module node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Dotted module path.
    pub path: String,
    /// Owning tag resolved against the registry.
    pub tag: DomainTag,
}

/// A directed import edge with both endpoints resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    pub from: String,
    pub to: String,
    pub from_tag: DomainTag,
    pub to_tag: DomainTag,
}

/// Directed module dependency graph.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ModuleNode, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Intern a module, resolving its tag on first sight.
    fn intern(&mut self, module: &str, registry: &DomainRegistry) -> NodeIndex {
        if let Some(&index) = self.indices.get(module) {
            return index;
        }
        let index = self.graph.add_node(ModuleNode {
            path: module.to_string(),
            tag: registry.resolve(module),
        });
        self.indices.insert(module.to_string(), index);
        index
    }

    /// Record an import edge.
    pub fn add_import(&mut self, from: &str, to: &str, registry: &DomainRegistry) {
        let from_index = self.intern(from, registry);
        let to_index = self.intern(to, registry);
        self.graph.add_edge(from_index, to_index, ());
    }

    /// All edges with resolved endpoint tags, in insertion order.
    pub fn edges(&self) -> Vec<ImportEdge> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (from, to) = self.graph.edge_endpoints(edge)?;
                let from_node = &self.graph[from];
                let to_node = &self.graph[to];
                Some(ImportEdge {
                    from: from_node.path.clone(),
                    to: to_node.path.clone(),
                    from_tag: from_node.tag.clone(),
                    to_tag: to_node.tag.clone(),
                })
            })
            .collect()
    }

    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Extracts import declarations into a [`DependencyGraph`].
pub struct ImportGraphBuilder {
    registry: DomainRegistry,
    graph: DependencyGraph,
    patterns: ImportPatterns,
}

struct ImportPatterns {
    from_import: Regex,
    plain_import: Regex,
}

impl ImportGraphBuilder {
    pub fn new(registry: DomainRegistry) -> Self {
        Self {
            registry,
            graph: DependencyGraph::default(),
            patterns: ImportPatterns {
                from_import: Regex::new(r"^\s*from\s+([.\w]+)\s+import\s").unwrap(),
                plain_import: Regex::new(r"^\s*import\s+(.+?)\s*$").unwrap(),
            },
        }
    }

    /// Extract every import declaration from one module's source.
    pub fn add_source(&mut self, module: &str, source: &str) {
        for line in source.lines() {
            if let Some(caps) = self.patterns.from_import.captures(line) {
                let target = caps.get(1).unwrap().as_str();
                if let Some(resolved) = resolve_relative(module, target) {
                    self.graph.add_import(module, &resolved, &self.registry);
                }
            } else if let Some(caps) = self.patterns.plain_import.captures(line) {
                // `import a.b, c.d as e` declares two targets.
                for part in caps.get(1).unwrap().as_str().split(',') {
                    if let Some(target) = part.trim().split_whitespace().next() {
                        if !target.is_empty() {
                            self.graph.add_import(module, target, &self.registry);
                        }
                    }
                }
            }
        }
    }

    /// Walk a source tree, deriving each file's module path from its
    /// location relative to the root.
    pub fn scan_tree(mut self, root: &Path) -> Result<DependencyGraph> {
        let files = fs::collect_files(root, "py")?;
        debug!(root = %root.display(), count = files.len(), "scanning source tree");
        for path in files {
            let Some(module) = module_path(root, &path) else {
                continue;
            };
            let source = fs::read_to_string(&path, MAX_MODULE_SIZE)?;
            self.add_source(&module, &source);
        }
        Ok(self.graph)
    }

    /// Consume the builder, returning the graph built so far.
    pub fn finish(self) -> DependencyGraph {
        self.graph
    }
}

/// Derive a dotted module path from a file path under the tree root.
/// `auth/login/service.py` -> `auth.login.service`; an `__init__.py` names
/// its package.
pub fn module_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let last = parts.pop()?;
    let stem = last.strip_suffix(".py")?;
    if stem != "__init__" {
        parts.push(stem.to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Resolve a possibly-relative import target against the importing module.
/// One leading dot means "the importing module's package"; each further dot
/// climbs one package. Returns `None` when the dots climb out of the tree.
fn resolve_relative(importer: &str, target: &str) -> Option<String> {
    if !target.starts_with('.') {
        return Some(target.to_string());
    }

    let dots = target.chars().take_while(|&c| c == '.').count();
    let remainder = &target[dots..];

    let mut package: Vec<&str> = importer.split('.').collect();
    // Drop the module's own name, then one more package per extra dot.
    for _ in 0..dots {
        package.pop()?;
    }
    if package.is_empty() && remainder.is_empty() {
        return None;
    }
    if !remainder.is_empty() {
        package.extend(remainder.split('.'));
    }
    Some(package.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn registry() -> DomainRegistry {
        DomainRegistry::from_yaml(
            r#"
domains:
  auth:
    - app.auth
  billing:
    - app.billing
shared_infra:
  - app.shared
frozen_legacy:
  - app.legacy
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_plain_imports() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source(
            "app.auth.login.service",
            "import app.shared.tokens\nimport json, app.legacy.users as users\n",
        );
        let graph = builder.finish();

        let edges = graph.edges();
        assert_eq!(edges.len(), 3);
        assert!(edges
            .iter()
            .any(|e| e.to == "app.shared.tokens" && e.to_tag == DomainTag::SharedInfra));
        assert!(edges
            .iter()
            .any(|e| e.to == "app.legacy.users" && e.to_tag == DomainTag::FrozenLegacy));
        assert!(edges
            .iter()
            .any(|e| e.to == "json" && e.to_tag == DomainTag::External));
    }

    #[test]
    fn test_extract_from_imports() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source(
            "app.auth.login.handler",
            "from app.billing.invoice.service import InvoiceService\n",
        );
        let edges = builder.finish().edges();

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from_tag, DomainTag::Domain("auth".to_string()));
        assert_eq!(edges[0].to_tag, DomainTag::Domain("billing".to_string()));
    }

    #[test]
    fn test_relative_import_resolution() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source(
            "app.auth.login.service",
            "from .repository import LoginRepository\nfrom ..shared_models import User\n",
        );
        let edges = builder.finish().edges();

        assert!(edges.iter().any(|e| e.to == "app.auth.login.repository"));
        assert!(edges.iter().any(|e| e.to == "app.auth.shared_models"));
    }

    #[test]
    fn test_module_path_derivation() {
        let root = PathBuf::from("/tree");
        assert_eq!(
            module_path(&root, &root.join("app/auth/login/service.py")),
            Some("app.auth.login.service".to_string())
        );
        assert_eq!(
            module_path(&root, &root.join("app/auth/__init__.py")),
            Some("app.auth".to_string())
        );
        assert_eq!(module_path(&root, &root.join("other.txt")), None);
    }

    #[test]
    fn test_scan_tree() {
        let dir = tempfile::tempdir().unwrap();
        let slice_dir = dir.path().join("app/auth/login");
        std::fs::create_dir_all(&slice_dir).unwrap();
        std::fs::write(
            slice_dir.join("service.py"),
            "from .repository import LoginRepository\nimport app.shared.tokens\n",
        )
        .unwrap();
        std::fs::write(slice_dir.join("repository.py"), "import json\n").unwrap();

        let graph = ImportGraphBuilder::new(registry())
            .scan_tree(dir.path())
            .unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert!(graph
            .edges()
            .iter()
            .any(|e| e.from == "app.auth.login.service" && e.to == "app.auth.login.repository"));
    }

    #[test]
    fn test_modules_are_interned_once() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.auth.a", "import app.shared.tokens\n");
        builder.add_source("app.auth.b", "import app.shared.tokens\n");
        let graph = builder.finish();

        assert_eq!(graph.module_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
