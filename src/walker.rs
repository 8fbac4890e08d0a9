//! Snapshot of the local tree, one task per directory.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::MirrorError;

/// One local directory to mirror: where it sits under the root, and the
/// files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTask {
    /// Path of the directory, built on the root as it was passed in.
    pub dir: PathBuf,
    /// Path relative to the mirror root; empty for the root.
    pub relative: PathBuf,
    /// Immediate child files, sorted by name.
    pub files: Vec<PathBuf>,
}

/// Result of walking the tree.
#[derive(Debug, Default)]
pub struct Scan {
    /// Directories in pre-order: every parent precedes its children.
    pub tasks: Vec<MirrorTask>,
    /// Entries that could not be read. Their subtrees are absent from `tasks`.
    pub failures: Vec<MirrorError>,
}

impl Scan {
    pub fn file_count(&self) -> usize {
        self.tasks.iter().map(|t| t.files.len()).sum()
    }
}

/// Walk `root` and group files under their directories.
///
/// Directory symlinks are not followed. A symlink is uploaded as a file
/// when it points at a regular file, or when its target cannot be read at
/// all, so that a dangling link surfaces as an upload failure. Other
/// entries (sockets, fifos, devices) are ignored.
pub fn scan(root: &Path) -> Scan {
    let mut result = Scan::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| {
            // Files before directories, so a directory's files immediately
            // follow it in the stream.
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                // A directory whose listing failed may already have a task.
                result.tasks.retain(|t| t.dir != path);
                result.failures.push(MirrorError::Walk {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            result.tasks.push(MirrorTask {
                dir: entry.path().to_path_buf(),
                relative,
                files: Vec::new(),
            });
        } else if file_type.is_file() || (file_type.is_symlink() && links_to_file(entry.path())) {
            let parent = entry.path().parent();
            match result.tasks.last_mut() {
                Some(task) if Some(task.dir.as_path()) == parent => {
                    task.files.push(entry.into_path());
                }
                _ => warn!(path = %entry.path().display(), "File outside any scanned directory"),
            }
        } else {
            debug!(path = %entry.path().display(), "Ignoring entry");
        }
    }

    result
}

fn links_to_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(target) => target.is_file(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("a/one.txt"), "1").unwrap();
        fs::write(root.join("b/two.txt"), "2").unwrap();
        fs::write(root.join("b/inner/three.txt"), "3").unwrap();
        dir
    }

    #[test]
    fn test_tasks_are_pre_order() {
        let dir = tree();
        let scan = scan(dir.path());

        let relatives: Vec<_> = scan.tasks.iter().map(|t| t.relative.clone()).collect();
        assert_eq!(
            relatives,
            vec![
                PathBuf::new(),
                PathBuf::from("a"),
                PathBuf::from("b"),
                PathBuf::from("b/inner"),
            ]
        );
        assert!(scan.failures.is_empty());
    }

    #[test]
    fn test_files_grouped_by_directory() {
        let dir = tree();
        let scan = scan(dir.path());

        assert_eq!(scan.file_count(), 4);
        assert_eq!(scan.tasks[0].files, vec![dir.path().join("top.txt")]);
        assert_eq!(scan.tasks[2].files, vec![dir.path().join("b/two.txt")]);
        assert_eq!(
            scan.tasks[3].files,
            vec![dir.path().join("b/inner/three.txt")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_to_files_are_kept() {
        use std::os::unix::fs::symlink;

        let dir = tree();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("target.jpg"), "img").unwrap();
        let root = dir.path();
        symlink(outside.path().join("target.jpg"), root.join("link.jpg")).unwrap();
        symlink(root.join("missing.txt"), root.join("dangling.txt")).unwrap();
        symlink(root.join("b"), root.join("a/to_b")).unwrap();

        let scan = scan(root);

        assert_eq!(
            scan.tasks[0].files,
            vec![
                root.join("dangling.txt"),
                root.join("link.jpg"),
                root.join("top.txt"),
            ]
        );
        // Directory links are neither descended into nor uploaded.
        assert_eq!(scan.tasks.len(), 4);
        assert_eq!(scan.tasks[1].files, vec![root.join("a/one.txt")]);
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        let scan = scan(dir.path());

        assert_eq!(scan.tasks.len(), 1);
        assert!(scan.tasks[0].relative.as_os_str().is_empty());
        assert!(scan.tasks[0].files.is_empty());
    }
}
