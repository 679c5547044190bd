//! The sequential per-slice pipeline: parse, compile, merge/generate,
//! write.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use slicewright_common_fs as fs;
use slicewright_skeleton::{read_existing, write_file_set, SkeletonGenerator};
use slicewright_spec::{compile_spec, Contract};

use crate::identity::{SliceIdentity, CONTRACT_FILE_NAME};

/// Largest spec or artifact file the pipeline will read.
const MAX_INPUT_SIZE: usize = 1024 * 1024;

/// What a generation run did to a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceAction {
    /// First generation: no prior files existed.
    Generated,
    /// Structural regions rebuilt around preserved code.
    Regenerated,
    /// Committed contract already matches the spec; nothing written.
    Unchanged,
}

/// Compile a slice's spec into its contract: the `compile-contract`
/// operation, with identity derived from the spec's location.
pub fn compile_slice(spec_path: &Path) -> anyhow::Result<(SliceIdentity, Contract)> {
    let identity = SliceIdentity::from_spec_path(spec_path)?;
    let source = fs::read_to_string(spec_path, MAX_INPUT_SIZE)?;
    let contract = compile_spec(&source, &identity.domain, &identity.slice)
        .with_context(|| format!("slice {}", identity))?;
    Ok((identity, contract))
}

/// Run the full generate-or-regenerate pipeline for one slice.
///
/// The committed contract artifact is the regeneration trigger: when it
/// already matches the freshly compiled spec byte-for-byte and every role
/// file is present, nothing is written at all.
pub fn generate_slice(spec_path: &Path, out_dir: &Path) -> anyhow::Result<SliceAction> {
    let (identity, contract) = compile_slice(spec_path)?;
    let canonical = contract
        .to_canonical_json()
        .with_context(|| format!("slice {}", identity))?;
    if let Ok(hash) = contract.content_hash() {
        debug!(slice = %identity, %hash, "contract compiled");
    }

    let contract_path = out_dir.join(CONTRACT_FILE_NAME);
    let committed = if contract_path.is_file() {
        Some(fs::read_to_string(&contract_path, MAX_INPUT_SIZE)?)
    } else {
        None
    };

    let existing = read_existing(out_dir, &identity.slice)?;
    let complete = existing.len() == slicewright_skeleton::FileRole::ALL.len();

    if committed.as_deref() == Some(canonical.as_str()) && complete {
        debug!(slice = %identity, "contract unchanged, skipping regeneration");
        return Ok(SliceAction::Unchanged);
    }

    let generator = SkeletonGenerator::new();
    let first_generation = existing.is_empty();
    let files = generator
        .generate_or_regenerate(&contract, Some(&existing))
        .with_context(|| format!("slice {}", identity))?;

    write_file_set(out_dir, &files)?;
    fs::write_string_atomic(&contract_path, &canonical)?;

    let action = if first_generation {
        SliceAction::Generated
    } else {
        SliceAction::Regenerated
    };
    info!(slice = %identity, ?action, "slice pipeline complete");
    Ok(action)
}
