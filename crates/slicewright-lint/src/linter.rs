//! The boundary linter.
//!
//! Consumes a dependency graph plus per-slice file/contract state and
//! produces an ordered violation list. Every rule is evaluated on every
//! input; nothing short-circuits, nothing is mutated, and an empty list is
//! the only success outcome.

use std::collections::HashMap;

use serde::Serialize;

use slicewright_skeleton::{check_markers, FileRole, MarkerStyle};
use slicewright_spec::compile_spec;

use crate::graph::DependencyGraph;
use crate::registry::{DomainRegistry, DomainTag};

/// The closed set of violation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CrossDomainImport,
    FrozenRegion,
    MissingFile,
    MarkerIntegrity,
    StaleContract,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrossDomainImport => "cross_domain_import",
            Self::FrozenRegion => "frozen_region",
            Self::MissingFile => "missing_file",
            Self::MarkerIntegrity => "marker_integrity",
            Self::StaleContract => "stale_contract",
        }
    }
}

/// A single lint finding. A pure report value; producing one never mutates
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// What rule was broken.
    pub kind: ViolationKind,
    /// Where: an edge (`from -> to`) or a slice-relative file path.
    pub location: String,
    /// Human-readable description.
    pub message: String,
}

/// Whether a violation list is a passing outcome.
pub fn is_clean(violations: &[Violation]) -> bool {
    violations.is_empty()
}

/// Per-slice state the linter evaluates alongside the graph.
#[derive(Debug, Clone)]
pub struct SliceState {
    /// Owning domain.
    pub domain: String,
    /// Slice name.
    pub slice: String,
    /// Current spec document source.
    pub spec_source: String,
    /// The committed contract artifact, if one exists.
    pub committed_contract: Option<String>,
    /// Present files by role.
    pub files: HashMap<FileRole, String>,
}

/// Evaluates isolation and integrity rules.
pub struct BoundaryLinter {
    style: MarkerStyle,
}

impl BoundaryLinter {
    pub fn new() -> Self {
        Self {
            style: MarkerStyle::PYTHON,
        }
    }

    /// Run every rule over the graph and slice states.
    ///
    /// The result is sorted by location, then kind, then message, so lint
    /// output is stable across runs regardless of input order.
    pub fn lint(
        &self,
        graph: &DependencyGraph,
        slices: &[SliceState],
        registry: &DomainRegistry,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        self.check_edges(graph, registry, &mut violations);
        for slice in slices {
            self.check_slice(slice, &mut violations);
        }

        violations.sort_by(|a, b| {
            (&a.location, a.kind, &a.message).cmp(&(&b.location, b.kind, &b.message))
        });
        violations
    }

    fn check_edges(
        &self,
        graph: &DependencyGraph,
        registry: &DomainRegistry,
        out: &mut Vec<Violation>,
    ) {
        for edge in graph.edges() {
            if let (DomainTag::Domain(from), DomainTag::Domain(to)) =
                (&edge.from_tag, &edge.to_tag)
            {
                if from != to {
                    out.push(Violation {
                        kind: ViolationKind::CrossDomainImport,
                        location: format!("{} -> {}", edge.from, edge.to),
                        message: format!(
                            "module in domain '{}' imports module in domain '{}'",
                            from, to
                        ),
                    });
                }
            }

            if edge.to_tag == DomainTag::FrozenLegacy && !registry.is_bridge_adapter(&edge.from)
            {
                out.push(Violation {
                    kind: ViolationKind::FrozenRegion,
                    location: format!("{} -> {}", edge.from, edge.to),
                    message: format!(
                        "'{}' imports frozen legacy module '{}'; only bridge adapters may",
                        edge.from, edge.to
                    ),
                });
            }
        }
    }

    fn check_slice(&self, slice: &SliceState, out: &mut Vec<Violation>) {
        let slice_path = format!("{}/{}", slice.domain, slice.slice);

        for role in FileRole::ALL {
            let file_name = role.file_name(&slice.slice);
            match slice.files.get(&role) {
                None => out.push(Violation {
                    kind: ViolationKind::MissingFile,
                    location: format!("{}/{}", slice_path, file_name),
                    message: format!("required {} file is missing", role.as_str()),
                }),
                Some(content) if role.has_preserved() => {
                    if let Err(err) = check_markers(content, self.style) {
                        out.push(Violation {
                            kind: ViolationKind::MarkerIntegrity,
                            location: format!("{}/{}", slice_path, file_name),
                            message: err.to_string(),
                        });
                    }
                }
                Some(_) => {}
            }
        }

        self.check_staleness(slice, &slice_path, out);
    }

    fn check_staleness(&self, slice: &SliceState, slice_path: &str, out: &mut Vec<Violation>) {
        let fresh = match compile_spec(&slice.spec_source, &slice.domain, &slice.slice) {
            Ok(contract) => contract,
            Err(err) => {
                // The committed artifact can no longer be derived from the
                // spec at all; that is drift.
                out.push(Violation {
                    kind: ViolationKind::StaleContract,
                    location: format!("{}/spec.md", slice_path),
                    message: format!("spec no longer compiles: {}", err),
                });
                return;
            }
        };

        let Some(committed) = &slice.committed_contract else {
            out.push(Violation {
                kind: ViolationKind::StaleContract,
                location: format!("{}/contract.json", slice_path),
                message: "no committed contract artifact".to_string(),
            });
            return;
        };

        let drifted = match fresh.to_canonical_json() {
            Ok(canonical) => &canonical != committed,
            Err(_) => true,
        };
        if drifted {
            out.push(Violation {
                kind: ViolationKind::StaleContract,
                location: format!("{}/contract.json", slice_path),
                message: "committed contract does not match the current spec".to_string(),
            });
        }
    }
}

impl Default for BoundaryLinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ImportGraphBuilder;
    use slicewright_skeleton::SkeletonGenerator;

    const SPEC: &str = "\
## Purpose
Authenticate a user.

## Inputs
- email: string
- password: string

## Outputs
- jwt_token: string

## Behaviour
- verify credentials

## Errors
- INVALID_CREDENTIALS: credentials do not match

## SideEffects
none

## Dependencies
none
";

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
bridge_adapters:
  - app.shared.legacy_bridge
"#,
        )
        .unwrap()
    }

    fn clean_slice_state() -> SliceState {
        let contract = compile_spec(SPEC, "auth", "login").unwrap();
        let files = SkeletonGenerator::new().generate(&contract).unwrap();
        SliceState {
            domain: "auth".to_string(),
            slice: "login".to_string(),
            spec_source: SPEC.to_string(),
            committed_contract: Some(contract.to_canonical_json().unwrap()),
            files: files.into_iter().map(|f| (f.role, f.content)).collect(),
        }
    }

    #[test]
    fn test_clean_inputs_produce_no_violations() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.auth.login.service", "from .repository import R\n");
        let graph = builder.finish();

        let violations =
            BoundaryLinter::new().lint(&graph, &[clean_slice_state()], &registry());
        assert!(is_clean(&violations), "unexpected: {violations:?}");
    }

    #[test]
    fn test_cross_domain_import_detected() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source(
            "app.auth.login.service",
            "from app.billing.invoice.service import InvoiceService\n",
        );
        let graph = builder.finish();

        let violations = BoundaryLinter::new().lint(&graph, &[], &registry());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::CrossDomainImport);
        assert_eq!(
            violations[0].location,
            "app.auth.login.service -> app.billing.invoice.service"
        );
    }

    #[test]
    fn test_shared_infra_import_allowed() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.auth.login.service", "import app.shared.tokens\n");
        let graph = builder.finish();

        let violations = BoundaryLinter::new().lint(&graph, &[], &registry());
        assert!(is_clean(&violations));
    }

    #[test]
    fn test_frozen_region_detected_from_any_domain() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.auth.login.service", "import app.legacy.users\n");
        builder.add_source("app.shared.tokens", "import app.legacy.sessions\n");
        let graph = builder.finish();

        let violations = BoundaryLinter::new().lint(&graph, &[], &registry());
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::FrozenRegion));
    }

    #[test]
    fn test_bridge_adapter_exemption() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.shared.legacy_bridge", "import app.legacy.users\n");
        let graph = builder.finish();

        let violations = BoundaryLinter::new().lint(&graph, &[], &registry());
        assert!(is_clean(&violations));
    }

    #[test]
    fn test_all_rules_reported_not_short_circuited() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source(
            "app.auth.login.service",
            "import app.legacy.users\nfrom app.billing.invoice.service import I\n",
        );
        let graph = builder.finish();

        let mut slice = clean_slice_state();
        slice.files.remove(&FileRole::Test);

        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::CrossDomainImport));
        assert!(kinds.contains(&ViolationKind::FrozenRegion));
        assert!(kinds.contains(&ViolationKind::MissingFile));
    }

    #[test]
    fn test_missing_files_reported_per_role() {
        let mut slice = clean_slice_state();
        slice.files.remove(&FileRole::Handler);
        slice.files.remove(&FileRole::Schema);

        let graph = DependencyGraph::default();
        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());

        let missing: Vec<&str> = violations
            .iter()
            .filter(|v| v.kind == ViolationKind::MissingFile)
            .map(|v| v.location.as_str())
            .collect();
        assert_eq!(missing, vec!["auth/login/handler.py", "auth/login/schemas.py"]);
    }

    #[test]
    fn test_marker_corruption_is_a_lint_finding() {
        let mut slice = clean_slice_state();
        let service = slice.files.get_mut(&FileRole::Service).unwrap();
        *service = service.replace("    # === BEGIN USER CODE ===\n", "");

        let graph = DependencyGraph::default();
        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::MarkerIntegrity);
        assert_eq!(violations[0].location, "auth/login/service.py");
        assert!(violations[0].message.contains("begin marker is missing"));
    }

    #[test]
    fn test_stale_contract_on_spec_edit() {
        let mut slice = clean_slice_state();
        slice.spec_source = slice
            .spec_source
            .replace("- password: string", "- password: string\n- otp: string");

        let graph = DependencyGraph::default();
        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::StaleContract);
    }

    #[test]
    fn test_stale_contract_when_artifact_missing() {
        let mut slice = clean_slice_state();
        slice.committed_contract = None;

        let graph = DependencyGraph::default();
        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::StaleContract);
        assert!(violations[0].message.contains("no committed contract"));
    }

    #[test]
    fn test_unparseable_spec_reported_as_stale() {
        let mut slice = clean_slice_state();
        slice.spec_source = "## Purpose\nBroken.\n\n## Outputs\n".to_string();

        let graph = DependencyGraph::default();
        let violations = BoundaryLinter::new().lint(&graph, &[slice], &registry());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::StaleContract);
        assert!(violations[0].message.contains("no longer compiles"));
    }

    #[test]
    fn test_violations_are_deterministically_ordered() {
        let mut builder = ImportGraphBuilder::new(registry());
        builder.add_source("app.billing.b", "import app.legacy.x\n");
        builder.add_source("app.auth.a", "import app.legacy.x\n");
        let graph = builder.finish();

        let violations = BoundaryLinter::new().lint(&graph, &[], &registry());
        assert_eq!(violations.len(), 2);
        assert!(violations[0].location < violations[1].location);
    }
}
