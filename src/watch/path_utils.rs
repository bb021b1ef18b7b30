// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Map an event path to its cache key if it names a direct child of `root`.
///
/// The key is always `root.join(file_name)`, so events reported under a
/// different absolute prefix for the same directory (symlinks, macOS
/// `/private/var/...`) still land on the key request handlers look up.
///
/// Returns `None` for the root itself and for anything nested deeper.
pub fn child_of_root(root: &Path, path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = path.parent()?;

    // Fast path: event path already starts with our root.
    if parent == root {
        return Some(root.join(name));
    }

    // The file itself may be gone, so canonicalize the parent only.
    let parent_canon = parent.canonicalize().ok()?;
    let root_canon = root.canonicalize().ok()?;
    if parent_canon == root_canon {
        return Some(root.join(name));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_children_map_onto_root() {
        let root = Path::new("/srv/site");
        assert_eq!(
            child_of_root(root, Path::new("/srv/site/index.html")),
            Some(PathBuf::from("/srv/site/index.html"))
        );
    }

    #[test]
    fn nested_and_foreign_paths_are_ignored() {
        let root = Path::new("/srv/site");
        assert_eq!(child_of_root(root, Path::new("/srv/site/css/app.css")), None);
        assert_eq!(child_of_root(root, Path::new("/tmp/other.txt")), None);
        assert_eq!(child_of_root(root, root), None);
    }

    #[test]
    fn symlinked_root_resolves_to_configured_root() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let root = real.canonicalize().unwrap();

        #[cfg(unix)]
        {
            let link = dir.path().join("link");
            std::os::unix::fs::symlink(&real, &link).unwrap();
            assert_eq!(
                child_of_root(&root, &link.join("a.txt")),
                Some(root.join("a.txt"))
            );
        }
    }
}
