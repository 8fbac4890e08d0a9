//! Splitting a visited directory into the folder names that must exist remotely.

use std::path::{Component, Path};

use crate::error::MirrorError;

/// Folder names from `root` down to `dir`, top first.
///
/// Returns an empty list when `dir` is the root itself. Fails with
/// `InvalidPath` when `dir` is not a descendant of `root`, or when the
/// remainder contains anything other than plain names (`..`, a prefix).
/// Names that are not valid UTF-8 fail with `InvalidName` instead of being
/// mangled into a different remote name.
pub fn decompose(root: &Path, dir: &Path) -> Result<Vec<String>, MirrorError> {
    let invalid = || MirrorError::InvalidPath {
        path: dir.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative = dir.strip_prefix(root).map_err(|_| invalid())?;
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| match c {
            Component::Normal(name) => name
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| MirrorError::InvalidName {
                    path: dir.to_path_buf(),
                }),
            _ => Err(invalid()),
        })
        .collect()
}
