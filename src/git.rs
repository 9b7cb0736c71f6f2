//! Git repository detection

use std::path::Path;

use git2::{Repository, RepositoryOpenFlags};

/// Check whether `path` itself is a git repository, either a working
/// directory holding `.git` or a bare repository.
///
/// Parent directories are never searched, so a plain directory inside a
/// repository is not a repository.
pub fn is_repository(path: &Path) -> bool {
    Repository::open_ext(
        path,
        RepositoryOpenFlags::NO_SEARCH,
        std::iter::empty::<&std::ffi::OsStr>(),
    )
    .is_ok()
}

/// Whether `path` is the administrative directory of a repository, which is
/// never worth descending into.
pub fn is_git_dir(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == ".git")
}
