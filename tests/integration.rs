//! Integration tests for grove


use harness::{TestTree, relative_lines, run_grove};

fn fixture() -> TestTree {
    let tree = TestTree::new();
    tree.add_repo("github.com/alice/one");
    tree.add_repo("github.com/alice/one/vendor/inner");
    tree.add_repo("github.com/bob/two");
    tree.add_file("github.com/bob/README", "bob's things");
    tree.add_dir("gitlab.com/carol/empty/deeper");
    tree.add_dir("gitlab.com/carol/also-empty");
    tree
}

#[test]
fn test_list_repositories() {
    let tree = fixture();

    let (stdout, stderr, success) = run_grove(tree.path(), &["list"]);
    assert!(success, "grove list should succeed: {}", stderr);
    assert_eq!(
        relative_lines(&stdout, tree.path()),
        ["github.com/alice/one", "github.com/bob/two"]
    );
}

#[test]
fn test_list_explicit_root() {
    let tree = fixture();
    let root = tree.path().join("github.com/bob");

    let (stdout, _stderr, success) =
        run_grove(tree.path(), &["list", root.to_str().unwrap()]);
    assert!(success);
    assert_eq!(relative_lines(&stdout, tree.path()), ["github.com/bob/two"]);
}

#[test]
fn test_list_with_pattern() {
    let tree = fixture();

    let (stdout, _stderr, success) = run_grove(tree.path(), &["list", "-p", "*/alice/*"]);
    assert!(success);
    assert_eq!(relative_lines(&stdout, tree.path()), ["github.com/alice/one"]);
}

#[test]
fn test_list_invalid_pattern() {
    let tree = fixture();

    let (_stdout, stderr, success) = run_grove(tree.path(), &["list", "-p", "[oops"]);
    assert!(!success);
    assert!(stderr.contains("invalid --pattern"), "stderr: {}", stderr);
}

#[test]
fn test_list_extra_roots_are_not_duplicated() {
    let tree = fixture();
    let extra = tree.path().join("github.com");

    let (stdout, _stderr, success) =
        run_grove(tree.path(), &["list", ".", "--also", extra.to_str().unwrap()]);
    assert!(success);
    assert_eq!(
        relative_lines(&stdout, tree.path()),
        ["github.com/alice/one", "github.com/bob/two"]
    );
}

#[test]
fn test_list_json() {
    let tree = fixture();

    let (stdout, _stderr, success) = run_grove(tree.path(), &["list", "--json"]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let items = parsed.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["score"], 0);
    assert!(items[0]["path"].as_str().unwrap().ends_with("github.com/alice/one"));
}

#[test]
fn test_sweep_innermost_first() {
    let tree = fixture();

    let (stdout, stderr, success) = run_grove(tree.path(), &["sweep"]);
    assert!(success, "grove sweep should succeed: {}", stderr);
    assert_eq!(
        relative_lines(&stdout, tree.path()),
        [
            "gitlab.com/carol/empty/deeper",
            "gitlab.com/carol/also-empty",
            "gitlab.com/carol/empty",
            "gitlab.com/carol",
            "gitlab.com",
        ]
    );
}

#[test]
fn test_sweep_remove() {
    let tree = fixture();

    let (_stdout, _stderr, success) = run_grove(tree.path(), &["sweep", "--remove"]);
    assert!(success);
    assert!(!tree.path().join("gitlab.com").exists());
    assert!(tree.path().join("github.com/bob/two").exists());
}

#[test]
fn test_jobs_do_not_change_output() {
    let tree = fixture();

    let (serial, _, ok1) = run_grove(tree.path(), &["-j", "1", "sweep"]);
    let (few, _, ok2) = run_grove(tree.path(), &["-j", "3", "sweep"]);
    let (unlimited, _, ok3) = run_grove(tree.path(), &["-j", "-1", "sweep"]);
    assert!(ok1 && ok2 && ok3);
    assert_eq!(serial, few);
    assert_eq!(serial, unlimited);
}

#[test]
fn test_root_from_environment() {
    let tree = fixture();
    let other = TestTree::new();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_grove"))
        .arg("list")
        .current_dir(other.path())
        .env("GROVE_ROOT", tree.path())
        .output()
        .expect("Failed to run grove");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        relative_lines(&stdout, tree.path()),
        ["github.com/alice/one", "github.com/bob/two"]
    );
}
