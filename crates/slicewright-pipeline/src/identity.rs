//! Slice identity derivation.
//!
//! The contract compiler takes `domain` and `slice` as plain inputs; this
//! is the directory-resolution collaborator that supplies them, derived
//! from the spec file's location: `<tree>/<domain>/<slice>/spec.md`.

use std::fmt;
use std::path::Path;

use slicewright_common_core::{Error, Result};

/// File name every slice spec lives under.
pub const SPEC_FILE_NAME: &str = "spec.md";

/// File name the committed contract artifact lives under.
pub const CONTRACT_FILE_NAME: &str = "contract.json";

/// A slice's identity within the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SliceIdentity {
    /// Owning domain.
    pub domain: String,
    /// Slice name.
    pub slice: String,
}

impl SliceIdentity {
    /// Derive identity from a spec path: the spec's directory names the
    /// slice, that directory's parent names the domain.
    pub fn from_spec_path(spec_path: &Path) -> Result<Self> {
        let slice_dir = spec_path
            .parent()
            .ok_or_else(|| bad_location(spec_path))?;
        let slice = dir_name(slice_dir).ok_or_else(|| bad_location(spec_path))?;
        let domain_dir = slice_dir.parent().ok_or_else(|| bad_location(spec_path))?;
        let domain = dir_name(domain_dir).ok_or_else(|| bad_location(spec_path))?;

        Ok(Self { domain, slice })
    }

    /// Stable `domain/slice` key, used for lock registration and reporting.
    pub fn key(&self) -> String {
        format!("{}/{}", self.domain, self.slice)
    }
}

impl fmt::Display for SliceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.slice)
    }
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

fn bad_location(spec_path: &Path) -> Error {
    Error::config(format!(
        "cannot derive domain/slice from spec location '{}': expected <tree>/<domain>/<slice>/{}",
        spec_path.display(),
        SPEC_FILE_NAME
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_identity_from_path() {
        let identity =
            SliceIdentity::from_spec_path(&PathBuf::from("/tree/auth/login/spec.md")).unwrap();
        assert_eq!(identity.domain, "auth");
        assert_eq!(identity.slice, "login");
        assert_eq!(identity.key(), "auth/login");
    }

    #[test]
    fn test_relative_path() {
        let identity =
            SliceIdentity::from_spec_path(&PathBuf::from("billing/invoice/spec.md")).unwrap();
        assert_eq!(identity.domain, "billing");
        assert_eq!(identity.slice, "invoice");
    }

    #[test]
    fn test_too_shallow_path_rejected() {
        assert!(SliceIdentity::from_spec_path(&PathBuf::from("spec.md")).is_err());
        assert!(SliceIdentity::from_spec_path(&PathBuf::from("login/spec.md")).is_err());
    }
}
