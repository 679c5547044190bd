//! Gathering per-slice state for the linter.

use std::path::Path;

use slicewright_common_fs as fs;
use slicewright_common_core::Result;
use slicewright_lint::SliceState;
use slicewright_skeleton::read_existing;

use crate::batch::discover_jobs;
use crate::identity::{SliceIdentity, CONTRACT_FILE_NAME};

/// Largest spec or artifact file the collector will read.
const MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Collect the lint input for every slice under a tree root: spec source,
/// committed contract (if any), and the present role files.
pub fn collect_slice_states(root: &Path) -> Result<Vec<SliceState>> {
    let mut states = Vec::new();

    for job in discover_jobs(root)? {
        let identity = SliceIdentity::from_spec_path(&job.spec_path)?;
        let spec_source = fs::read_to_string(&job.spec_path, MAX_INPUT_SIZE)?;

        let contract_path = job.out_dir.join(CONTRACT_FILE_NAME);
        let committed_contract = if contract_path.is_file() {
            Some(fs::read_to_string(&contract_path, MAX_INPUT_SIZE)?)
        } else {
            None
        };

        let files = match read_existing(&job.out_dir, &identity.slice) {
            Ok(files) => files,
            Err(slicewright_skeleton::SkeletonError::Fs(e)) => return Err(e),
            Err(other) => return Err(slicewright_common_core::Error::new(other.to_string())),
        };

        states.push(SliceState {
            domain: identity.domain,
            slice: identity.slice,
            spec_source,
            committed_contract,
            files,
        });
    }

    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::generate_slice;
    use tempfile::tempdir;

    const SPEC: &str = "\
## Purpose
Do a thing.

## Inputs
- name: string

## Outputs
- ok: boolean

## Behaviour
- do it

## Errors

## SideEffects
none

## Dependencies
none
";

    #[test]
    fn test_collect_after_generation() {
        let dir = tempdir().unwrap();
        let slice_dir = dir.path().join("ops/ping");
        std::fs::create_dir_all(&slice_dir).unwrap();
        let spec_path = slice_dir.join("spec.md");
        std::fs::write(&spec_path, SPEC).unwrap();

        generate_slice(&spec_path, &slice_dir).unwrap();

        let states = collect_slice_states(dir.path()).unwrap();
        assert_eq!(states.len(), 1);
        let state = &states[0];
        assert_eq!(state.domain, "ops");
        assert_eq!(state.slice, "ping");
        assert!(state.committed_contract.is_some());
        assert_eq!(state.files.len(), 5);
    }

    #[test]
    fn test_collect_before_generation() {
        let dir = tempdir().unwrap();
        let slice_dir = dir.path().join("ops/ping");
        std::fs::create_dir_all(&slice_dir).unwrap();
        std::fs::write(slice_dir.join("spec.md"), SPEC).unwrap();

        let states = collect_slice_states(dir.path()).unwrap();
        assert_eq!(states.len(), 1);
        assert!(states[0].committed_contract.is_none());
        assert!(states[0].files.is_empty());
    }
}
