//! Circular dependency tests
//!
//! Cycles must terminate, keep partial results, and never be confused with
//! shared (diamond) dependencies.

use std::path::{Path, PathBuf};

use kustomtrace::KustomTrace;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_mutual_cycle_has_no_roots() {
    let dir = TempDir::new().unwrap();
    let a = write(
        dir.path(),
        "a/kustomization.yaml",
        "resources:\n  - ../b\n  - a.yaml\n",
    );
    let b = write(dir.path(), "b/kustomization.yaml", "resources:\n  - ../a\n");
    let a_file = write(dir.path(), "a/a.yaml", "kind: ConfigMap\n");

    let trace = KustomTrace::from_directory(dir.path()).unwrap();
    assert!(trace.root_apps().is_empty());
    assert!(trace.apps_with(&a_file).unwrap().is_empty());

    // Closure still terminates and includes everything reachable
    assert_eq!(trace.app_files(&a).unwrap(), vec![a.clone(), b.clone(), a_file]);
    assert_eq!(trace.app_files(&b).unwrap(), vec![b, a.clone(), dir.path().join("a/a.yaml")]);
}

#[test]
fn test_cycle_below_a_root() {
    let dir = TempDir::new().unwrap();
    let root = write(dir.path(), "root/kustomization.yaml", "resources:\n  - ../x\n");
    let x = write(
        dir.path(),
        "x/kustomization.yaml",
        "resources:\n  - ../y\n  - x.yaml\n",
    );
    let y = write(dir.path(), "y/kustomization.yaml", "components:\n  - ../x\n");
    let x_file = write(dir.path(), "x/x.yaml", "kind: Secret\n");

    let trace = KustomTrace::from_directory(dir.path()).unwrap();
    assert_eq!(trace.root_apps(), vec![root.clone()]);

    // x is reached through root and through the y <-> x cycle; only root is a root
    assert_eq!(trace.apps_with(&x_file).unwrap(), vec![root.clone()]);
    assert_eq!(trace.apps_with(&y).unwrap(), vec![root.clone()]);
    assert_eq!(trace.app_files(&root).unwrap(), vec![root, x, y, x_file]);
}

#[test]
fn test_three_node_cycle_terminates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/kustomization.yaml", "resources:\n  - ../b\n");
    write(dir.path(), "b/kustomization.yaml", "bases:\n  - ../c\n");
    write(dir.path(), "c/kustomization.yaml", "components:\n  - ../a\n");

    let trace = KustomTrace::from_directory_with_threads(dir.path(), 4).unwrap();
    assert_eq!(trace.graph().len(), 3);
    assert!(trace.root_apps().is_empty());
    for app in ["a", "b", "c"] {
        assert_eq!(trace.app_files(&dir.path().join(app)).unwrap().len(), 3);
    }
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let dir = TempDir::new().unwrap();
    let top = write(
        dir.path(),
        "top/kustomization.yaml",
        "resources:\n  - ../left\n  - ../right\n",
    );
    let left = write(dir.path(), "left/kustomization.yaml", "resources:\n  - ../base\n");
    let right = write(dir.path(), "right/kustomization.yaml", "resources:\n  - ../base\n");
    let base = write(dir.path(), "base/kustomization.yaml", "resources:\n  - cm.yaml\n");
    let cm = write(dir.path(), "base/cm.yaml", "kind: ConfigMap\n");

    let trace = KustomTrace::from_directory(dir.path()).unwrap();
    assert_eq!(trace.root_apps(), vec![top.clone()]);
    assert_eq!(trace.apps_with(&cm).unwrap(), vec![top.clone()]);
    assert_eq!(
        trace.app_files(&top).unwrap(),
        vec![top, left, base, cm, right]
    );
}
