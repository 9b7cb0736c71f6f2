//! Filesystem nodes consumed by the walker
//!
//! A node is a capability rather than a record: it knows how to resolve its
//! own canonical path, list its entries and turn a recursable entry into a
//! child node. [`DiskNode`] is the implementation backed by real directories.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Coarse file type of a listed entry, taken without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// One entry in a node's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: OsString,
    kind: EntryKind,
}

impl Entry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// A position in a tree and the means to enumerate and descend into it.
///
/// Implementations hold no mutable state; child nodes are derived from their
/// parent and never changed afterwards.
pub trait FsNode: Clone + Send + Sync {
    /// Resolve the canonical path of this node, following any links.
    /// Must return the same value every time it is called.
    fn canonical_path(&self) -> io::Result<PathBuf>;

    /// List the entries of the node at `path` (its canonical path).
    /// The order must be fixed for an unchanged tree.
    fn list_children(&self, path: &Path) -> io::Result<Vec<Entry>>;

    /// Whether `entry` is itself a node that can be recursed into.
    fn can_descend(&self, path: &Path, entry: &Entry) -> io::Result<bool>;

    /// Create the child node for a recursable `entry`.
    fn child(&self, path: &Path, entry: &Entry) -> Self;

    /// The path this node was created with, before any resolution.
    /// Used to name nodes whose canonical path can't be determined.
    fn path_hint(&self) -> PathBuf;
}

/// A node backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskNode {
    path: PathBuf,
    follow_links: bool,
}

impl DiskNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            follow_links: false,
        }
    }

    /// Treat symbolic links to directories as recursable.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FsNode for DiskNode {
    fn canonical_path(&self) -> io::Result<PathBuf> {
        fs::canonicalize(&self.path)
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(Entry::new(entry.file_name(), entry.file_type()?.into()));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn can_descend(&self, path: &Path, entry: &Entry) -> io::Result<bool> {
        match entry.kind {
            EntryKind::Dir => Ok(true),
            EntryKind::Symlink if self.follow_links => {
                // dangling and looping links are plain entries
                Ok(fs::metadata(path.join(&entry.name)).is_ok_and(|meta| meta.is_dir()))
            }
            _ => Ok(false),
        }
    }

    fn child(&self, path: &Path, entry: &Entry) -> Self {
        Self {
            path: path.join(&entry.name),
            follow_links: self.follow_links,
        }
    }

    fn path_hint(&self) -> PathBuf {
        self.path.clone()
    }
}
