// tests/target_resolver.rs

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use as_soon::fs::RealFileSystem;
use as_soon::fs::mock::MockFileSystem;
use as_soon::watch::path_utils::{normalize_path, paths_match};
use as_soon::watch::{TargetKind, WatchTarget, resolve_targets};

#[test]
fn relative_paths_are_resolved_against_the_working_directory() {
    let cwd = Path::new("/home/me/proj");
    assert_eq!(normalize_path("src", cwd), PathBuf::from("/home/me/proj/src"));
    assert_eq!(normalize_path("./src/", cwd), PathBuf::from("/home/me/proj/src"));
    assert_eq!(normalize_path(".", cwd), PathBuf::from("/home/me/proj"));
    assert_eq!(normalize_path("../other//x", cwd), PathBuf::from("/home/me/other/x"));
    assert_eq!(normalize_path("/etc/./hosts", cwd), PathBuf::from("/etc/hosts"));
}

#[test]
fn parent_components_never_climb_above_the_root() {
    let cwd = Path::new("/a");
    assert_eq!(normalize_path("../../../..", cwd), PathBuf::from("/"));
    assert_eq!(normalize_path("/../x", cwd), PathBuf::from("/x"));
}

#[test]
fn targets_are_classified_by_what_exists() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/src");
    fs.add_file("/proj/Cargo.toml", "[package]");
    let cwd = Path::new("/proj");

    assert_eq!(WatchTarget::resolve(&fs, "src", cwd).kind, TargetKind::Directory);
    assert_eq!(WatchTarget::resolve(&fs, "Cargo.toml", cwd).kind, TargetKind::File);

    let pending = WatchTarget::resolve(&fs, "out/", cwd);
    assert_eq!(pending.kind, TargetKind::Pending);
    assert_eq!(pending.path, PathBuf::from("/proj/out"));
    assert_eq!(pending.display, "out/");
    assert_eq!(pending.parent(), Some(Path::new("/proj")));
}

#[test]
fn reclassify_follows_the_filesystem() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj");
    let mut target = WatchTarget::resolve(&fs, "out", Path::new("/proj"));
    assert_eq!(target.kind, TargetKind::Pending);

    fs.add_dir("/proj/out");
    assert_eq!(target.reclassify(&fs), TargetKind::Directory);
    assert_eq!(target.kind, TargetKind::Directory);
}

#[test]
fn duplicate_targets_are_collapsed_in_cli_order() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/src");
    let raws = vec![
        "src".to_string(),
        "lib".to_string(),
        "./src/".to_string(),
        "/proj/src".to_string(),
    ];

    let targets = resolve_targets(&fs, &raws, Path::new("/proj"));
    let paths: Vec<_> = targets.iter().map(|t| t.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("/proj/src"), PathBuf::from("/proj/lib")]);
}

#[test]
fn paths_match_is_lexical_first() {
    let fs = MockFileSystem::new();
    assert!(paths_match(
        Path::new("/proj/a.txt"),
        Path::new("/proj/./a.txt"),
        &fs
    ));
    assert!(!paths_match(
        Path::new("/proj/a.txt"),
        Path::new("/proj/b.txt"),
        &fs
    ));
}

#[cfg(unix)]
#[test]
fn paths_match_sees_through_symlinked_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let real = tmp.path().join("real");
    std::fs::create_dir(&real).unwrap();
    let link = tmp.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    // The file itself does not have to exist.
    assert!(paths_match(
        &link.join("gone.txt"),
        &real.join("gone.txt"),
        &RealFileSystem
    ));
    assert!(!paths_match(
        &link.join("gone.txt"),
        &real.join("other.txt"),
        &RealFileSystem
    ));
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(".".to_string()),
        Just("..".to_string()),
        "[a-z]{1,6}",
    ]
}

proptest! {
    #[test]
    fn normalized_paths_are_absolute_and_canonical_in_form(
        segments in proptest::collection::vec(segment(), 0..8),
        trailing in any::<bool>(),
    ) {
        let mut raw = segments.join("/");
        if trailing {
            raw.push('/');
        }
        let cwd = Path::new("/work/dir");
        let normalized = normalize_path(&raw, cwd);

        prop_assert!(normalized.is_absolute());
        let s = normalized.to_string_lossy();
        prop_assert!(s == "/" || !s.ends_with('/'));
        prop_assert!(!s.contains("/./"));
        prop_assert!(!s.split('/').any(|c| c == "." || c == ".."));

        // Normalizing again changes nothing.
        prop_assert_eq!(normalize_path(&normalized, Path::new("/elsewhere")), normalized.clone());
    }
}
