//! A throwaway served directory backed by a temp dir.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use waitserve::fs::RealFileSystem;
use waitserve::store::FingerprintStore;

pub struct TestSite {
    _dir: TempDir,
    root: PathBuf,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        // Canonical so keys match the paths notify reports (macOS /private/var).
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write test file");
        path
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.path(name)).expect("remove test file");
    }

    /// Store watching this site, already seeded.
    pub async fn start(&self) -> Arc<FingerprintStore> {
        waitserve::start_tracking(&self.root, Arc::new(RealFileSystem))
            .await
            .expect("start tracking test site")
    }
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}
