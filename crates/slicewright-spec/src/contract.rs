//! Contract compilation and canonical serialization.
//!
//! A contract is a pure function of its spec IR plus the externally supplied
//! domain and slice identifiers. Identical IR always yields byte-identical
//! canonical JSON: struct fields serialize in declaration order and field
//! maps are [`IndexMap`]s that keep spec declaration order, so no incidental
//! host-map iteration order can leak into the artifact. Regeneration
//! decisions compare those canonical bytes (or their hash), nothing else.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::parsing::{SpecIr, SpecParser};
use crate::types::FieldType;

/// Version stamp embedded in every contract artifact.
pub const CONTRACT_VERSION: u32 = 1;

/// A declared error carried into the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContract {
    /// Upper-case error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The canonical machine artifact compiled from a spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Artifact format version.
    pub version: u32,
    /// Owning domain, derived from the spec's location.
    pub domain: String,
    /// Slice name, derived from the spec's location.
    pub slice: String,
    /// Input fields in declaration order.
    pub inputs: IndexMap<String, FieldType>,
    /// Output fields in declaration order.
    pub outputs: IndexMap<String, FieldType>,
    /// Behaviour steps, verbatim, in declaration order.
    pub behaviour: Vec<String>,
    /// Error declarations in declaration order.
    pub errors: Vec<ErrorContract>,
    /// Side-effect items.
    pub side_effects: Vec<String>,
    /// Dependency items.
    pub dependencies: Vec<String>,
}

impl Contract {
    /// Canonical serialization: fixed field order, declaration-ordered maps,
    /// pretty JSON, trailing newline. Byte-identical for identical input.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Parse a previously committed contract artifact.
    pub fn from_json(artifact: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(artifact)
    }

    /// Blake3 hash of the canonical bytes, hex-encoded.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        let canonical = self.to_canonical_json()?;
        Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }

    /// Whether a committed artifact has drifted from this contract.
    pub fn differs_from(&self, committed: &str) -> Result<bool, serde_json::Error> {
        Ok(self.to_canonical_json()? != committed)
    }
}

/// Compile a spec IR into a contract.
///
/// Pure and total: the parser has already rejected malformed types, so no
/// partial contract can ever be emitted from a valid IR.
pub fn compile(ir: &SpecIr, domain: &str, slice: &str) -> Contract {
    Contract {
        version: CONTRACT_VERSION,
        domain: domain.to_string(),
        slice: slice.to_string(),
        inputs: ir
            .inputs
            .iter()
            .map(|f| (f.name.clone(), f.ty.clone()))
            .collect(),
        outputs: ir
            .outputs
            .iter()
            .map(|f| (f.name.clone(), f.ty.clone()))
            .collect(),
        behaviour: ir.behaviour.clone(),
        errors: ir
            .errors
            .iter()
            .map(|e| ErrorContract {
                code: e.code.clone(),
                message: e.message.clone(),
            })
            .collect(),
        side_effects: ir.side_effects.clone(),
        dependencies: ir.dependencies.clone(),
    }
}

/// Parse and compile in one step: the `compile-contract` operation.
pub fn compile_spec(source: &str, domain: &str, slice: &str) -> Result<Contract, SpecError> {
    let ir = SpecParser::new().parse(source)?;
    Ok(compile(&ir, domain, slice))
}
