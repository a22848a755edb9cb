//! git2-built fixture repositories for tests

use std::path::Path;

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use crate::repository::GitRepo;

/// A throwaway repository on disk
pub struct FixtureRepo {
    pub temp: TempDir,
    pub repo: Repository,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        Self { temp, repo }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn repo(&self) -> GitRepo {
        GitRepo::open(self.temp.path()).unwrap()
    }

    fn signature(&self) -> Signature<'static> {
        Signature::now("Test", "test@example.com").unwrap()
    }

    fn write_tree(&self, files: &[(&str, &str)]) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (path, content) in files {
            let full = self.temp.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        index.write_tree().unwrap()
    }

    /// Commit files on top of HEAD
    pub fn commit(&self, message: &str, files: &[(&str, &str)]) -> String {
        let tree = self.repo.find_tree(self.write_tree(files)).unwrap();
        let sig = self.signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Commit on top of `parent` without moving HEAD
    pub fn commit_on(&self, parent: &str, message: &str, files: &[(&str, &str)]) -> String {
        let tree = self.repo.find_tree(self.write_tree(files)).unwrap();
        let sig = self.signature();
        let parent = self.repo.find_commit(Oid::from_str(parent).unwrap()).unwrap();

        self.repo
            .commit(None, &sig, &sig, message, &tree, &[&parent])
            .unwrap()
            .to_string()
    }

    /// Merge `side` into HEAD with a merge commit
    pub fn merge(&self, side: &str, message: &str) -> String {
        let sig = self.signature();
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let side = self.repo.find_commit(Oid::from_str(side).unwrap()).unwrap();
        let tree = side.tree().unwrap();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &side])
            .unwrap()
            .to_string()
    }

    /// Create a lightweight tag
    pub fn tag(&self, name: &str, hash: &str) {
        let object = self.repo.find_object(Oid::from_str(hash).unwrap(), None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    /// Create an annotated tag
    pub fn annotated_tag(&self, name: &str, hash: &str, message: &str) {
        let object = self.repo.find_object(Oid::from_str(hash).unwrap(), None).unwrap();
        let sig = self.signature();
        self.repo.tag(name, &object, &sig, message, false).unwrap();
    }
}
