//! Test utilities for building directory trees.
//!
//! This module is only compiled for tests and benchmarks.
//!
//! - [`TestTree`]: a real temporary directory, optionally holding git repositories
//! - [`MemTree`]: an in-memory tree whose nodes can be walked without touching disk

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use crate::node::{DiskNode, Entry, EntryKind, FsNode};

/// A temporary directory tree for testing.
///
/// The directory is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Canonical path of `rel` inside the tree.
    pub fn canonical(&self, rel: &str) -> PathBuf {
        fs::canonicalize(self.dir.path().join(rel)).expect("Failed to canonicalize")
    }

    /// A walkable node for the tree's root.
    pub fn node(&self) -> DiskNode {
        DiskNode::new(self.dir.path())
    }

    /// Create a directory, along with its parents.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dirs");
        full_path
    }

    /// Create a file, along with its parent directories.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create a symbolic link at `path` pointing at `target`, taken verbatim.
    pub fn add_link(&self, path: &str, target: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        symlink(target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// Initialize a git repository at `path`.
    ///
    /// Also configures user.email and user.name for commits.
    pub fn add_repo(&self, path: &str) -> PathBuf {
        let full_path = self.add_dir(path);

        Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(&full_path)
            .output()
            .expect("Failed to init git");

        Command::new("git")
            .args(["config", "user.email", "test@test.com"])
            .current_dir(&full_path)
            .output()
            .expect("Failed to set git email");

        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(&full_path)
            .output()
            .expect("Failed to set git name");

        full_path
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
enum MemKind {
    Dir,
    File,
    Link(PathBuf),
}

/// An in-memory directory tree rooted at `/`.
///
/// Paths given to the builder methods are relative to the root. Listing a
/// directory marked [`MemTree::unreadable`] fails.
#[derive(Debug, Clone, Default)]
pub struct MemTree {
    nodes: HashMap<PathBuf, MemKind>,
    unreadable: HashSet<PathBuf>,
}

impl MemTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn abs(path: &str) -> PathBuf {
        Path::new("/").join(path)
    }

    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor != Path::new("/") {
                self.nodes.entry(ancestor.to_path_buf()).or_insert(MemKind::Dir);
            }
        }
    }

    /// Add a directory, along with its parents.
    pub fn dir(mut self, path: &str) -> Self {
        let path = Self::abs(path);
        self.add_parents(&path);
        self.nodes.insert(path, MemKind::Dir);
        self
    }

    /// Add a file, along with its parent directories.
    pub fn file(mut self, path: &str) -> Self {
        let path = Self::abs(path);
        self.add_parents(&path);
        self.nodes.insert(path, MemKind::File);
        self
    }

    /// Add a link at `path` to `target`, both relative to the root.
    pub fn link(mut self, path: &str, target: &str) -> Self {
        let path = Self::abs(path);
        self.add_parents(&path);
        self.nodes.insert(path, MemKind::Link(Self::abs(target)));
        self
    }

    /// Make listing `path` fail.
    pub fn unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(Self::abs(path));
        self
    }

    /// Node for the root, not following links.
    pub fn root(self) -> MemNode {
        self.node("")
    }

    /// Node for `path`, not following links.
    pub fn node(self, path: &str) -> MemNode {
        MemNode {
            tree: Arc::new(self),
            path: Self::abs(path),
            follow_links: false,
        }
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::from("/");
        for component in path.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            resolved.push(name);
            // bounded against link loops
            for _ in 0..32 {
                if resolved == Path::new("/") {
                    break;
                }
                match self.nodes.get(&resolved) {
                    Some(MemKind::Link(target)) => resolved = target.clone(),
                    Some(_) => break,
                    None => {
                        return Err(io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("{} does not exist", resolved.display()),
                        ));
                    }
                }
            }
        }
        Ok(resolved)
    }
}

/// A node of a [`MemTree`].
#[derive(Debug, Clone)]
pub struct MemNode {
    tree: Arc<MemTree>,
    path: PathBuf,
    follow_links: bool,
}

impl MemNode {
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Another node of the same tree.
    pub fn sibling_root(&self, path: &str) -> MemNode {
        MemNode {
            tree: Arc::clone(&self.tree),
            path: MemTree::abs(path),
            follow_links: self.follow_links,
        }
    }
}

impl FsNode for MemNode {
    fn canonical_path(&self) -> io::Result<PathBuf> {
        self.tree.resolve(&self.path)
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<Entry>> {
        if self.tree.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is unreadable", path.display()),
            ));
        }
        let mut entries: Vec<Entry> = self
            .tree
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, kind)| {
                let kind = match kind {
                    MemKind::Dir => EntryKind::Dir,
                    MemKind::File => EntryKind::File,
                    MemKind::Link(_) => EntryKind::Symlink,
                };
                Some(Entry::new(p.file_name()?, kind))
            })
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }

    fn can_descend(&self, path: &Path, entry: &Entry) -> io::Result<bool> {
        match entry.kind() {
            EntryKind::Dir => Ok(true),
            EntryKind::Symlink if self.follow_links => {
                let target = self.tree.resolve(&path.join(entry.name()))?;
                let is_dir = target == Path::new("/")
                    || matches!(self.tree.nodes.get(&target), Some(MemKind::Dir));
                Ok(is_dir)
            }
            _ => Ok(false),
        }
    }

    fn child(&self, path: &Path, entry: &Entry) -> Self {
        MemNode {
            tree: Arc::clone(&self.tree),
            path: path.join(entry.name()),
            follow_links: self.follow_links,
        }
    }

    fn path_hint(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_tree_listing() {
        let root = MemTree::new().dir("b").file("a").link("c", "b").root();
        let entries = root.list_children(Path::new("/")).unwrap();
        let kinds: Vec<_> = entries.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, [EntryKind::File, EntryKind::Dir, EntryKind::Symlink]);
    }

    #[test]
    fn test_mem_tree_resolves_links() {
        let node = MemTree::new().dir("a/b").link("a/b/up", "a").node("a/b/up/b");
        assert_eq!(node.canonical_path().unwrap(), PathBuf::from("/a/b"));
        assert_eq!(node.path_hint(), PathBuf::from("/a/b/up/b"));
    }

    #[test]
    fn test_mem_tree_unreadable() {
        let root = MemTree::new().dir("x").unreadable("x").root();
        assert!(root.list_children(Path::new("/x")).is_err());
    }

    #[test]
    fn test_test_tree_repo() {
        let tree = TestTree::new();
        let repo = tree.add_repo("code/project");
        assert!(repo.join(".git").exists());
    }
}
