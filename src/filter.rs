//! Glob filters on paths relative to a walk root

use std::path::Path;

use glob::{MatchOptions, Pattern, PatternError};

/// Accepts paths matching any of its patterns; with no patterns it accepts
/// everything.
///
/// Patterns are matched against the path relative to the walk root, with
/// components joined by `/`. A `*` does not cross a `/`.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<Pattern>,
}

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl PathFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check `path`, which lives below `root`.
    pub fn matches(&self, path: &Path, root: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let rel = relative_name(path, root);
        self.patterns.iter().any(|p| p.matches_with(&rel, OPTIONS))
    }
}

/// `path` relative to `root` with `/` separators; `.` for the root itself.
pub fn relative_name(path: &Path, root: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> PathFilter {
        PathFilter::new(patterns).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let f = filter(&[]);
        assert!(f.is_empty());
        assert!(f.matches(Path::new("/root/anything"), Path::new("/root")));
    }

    #[test]
    fn test_glob_match() {
        let root = Path::new("/src");
        let f = filter(&["github.com/*/project"]);
        assert!(f.matches(Path::new("/src/github.com/sam/project"), root));
        assert!(!f.matches(Path::new("/src/github.com/sam/nested/project"), root));
        assert!(!f.matches(Path::new("/src/gitlab.com/sam/project"), root));

        // Single character wildcard and character classes
        let f = filter(&["repo?", "[ab].git"]);
        assert!(f.matches(Path::new("/src/repo1"), root));
        assert!(!f.matches(Path::new("/src/repo12"), root));
        assert!(f.matches(Path::new("/src/a.git"), root));
        assert!(!f.matches(Path::new("/src/c.git"), root));
    }

    #[test]
    fn test_any_pattern() {
        let f = filter(&["*/a", "**/b"]);
        let root = Path::new("/r");
        assert!(f.matches(Path::new("/r/x/a"), root));
        assert!(f.matches(Path::new("/r/x/y/z/b"), root));
        assert!(!f.matches(Path::new("/r/x/c"), root));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PathFilter::new(&["[unclosed"]).is_err());
    }

    #[test]
    fn test_relative_name() {
        assert_eq!(relative_name(Path::new("/r/a/b"), Path::new("/r")), "a/b");
        assert_eq!(relative_name(Path::new("/r"), Path::new("/r")), ".");
        assert_eq!(
            relative_name(Path::new("/elsewhere/x"), Path::new("/r")),
            "/elsewhere/x"
        );
    }
}
