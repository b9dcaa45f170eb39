//! Integration tests for base-directory and installation resolution
//!
//! These tests verify:
//! - Resolution at the first qualifying ancestor level
//! - Exactness of the disambiguation set
//! - The two-phase finalize flow
//! - Fatal failure when the ascent bound is exceeded

use camino::{Utf8Path, Utf8PathBuf};
use dflnp::services::path_resolver::{
    DEFAULT_MAX_ASCENT, Resolution, ResolveError, SignatureMarker, finalize, resolve,
};
use std::fs;
use tempfile::TempDir;

fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
}

fn make_install(parent: &Utf8Path, name: &str) -> Utf8PathBuf {
    let install = parent.join(name);
    fs::create_dir_all(install.join("data").join("init")).unwrap();
    install
}

#[test]
fn unique_install_at_level_k_sets_base_to_that_ancestor() {
    // One plausible installation exists k=3 levels above the launcher and
    // none closer; the base directory must be exactly that ancestor.
    let temp_dir = TempDir::new().unwrap();
    let base = utf8_dir(&temp_dir);
    let install = make_install(&base, "df_44_12");

    let mut launcher_dir = base.clone();
    for name in ["LNP", "launchers", "dflnp"] {
        launcher_dir = launcher_dir.join(name);
    }
    fs::create_dir_all(&launcher_dir).unwrap();

    let marker = SignatureMarker::dwarf_fortress();
    let resolution = resolve(&launcher_dir, &marker, DEFAULT_MAX_ASCENT).unwrap();

    match resolution {
        Resolution::Resolved(root) => {
            assert_eq!(root.base_dir, base);
            assert_eq!(root.install_dir, install);
        }
        other => panic!("expected resolved root, got {other:?}"),
    }
}

#[test]
fn disambiguation_set_contains_exactly_the_candidates() {
    let temp_dir = TempDir::new().unwrap();
    let base = utf8_dir(&temp_dir);
    let a = make_install(&base, "df_a");
    let b = make_install(&base, "df_b");
    let c = make_install(&base, "df_c");
    // Distractors that must not appear.
    fs::create_dir_all(base.join("Utilities")).unwrap();
    fs::write(base.join("notes.txt"), "not a directory").unwrap();

    let marker = SignatureMarker::dwarf_fortress();
    let resolution = resolve(&base, &marker, DEFAULT_MAX_ASCENT).unwrap();

    match resolution {
        Resolution::Ambiguous {
            base_dir,
            candidates,
        } => {
            assert_eq!(base_dir, base);
            assert_eq!(candidates, vec![a.clone(), b, c]);

            // The frontend picks; finalize completes the two-phase API.
            let root = finalize(&base_dir, &a);
            assert_eq!(root.install_dir, a);
            assert_eq!(root.base_dir, base);
        }
        other => panic!("expected disambiguation set, got {other:?}"),
    }
}

#[test]
fn nearer_level_shadows_deeper_candidates() {
    // Candidates exist both one and two levels up; only the nearer level's
    // candidate may be reported even though the deeper level has more.
    let temp_dir = TempDir::new().unwrap();
    let grandparent = utf8_dir(&temp_dir);
    make_install(&grandparent, "df_old_1");
    make_install(&grandparent, "df_old_2");
    let parent = grandparent.join("newpack");
    let near = make_install(&parent, "df_new");
    let launcher_dir = parent.join("launcher");
    fs::create_dir_all(&launcher_dir).unwrap();

    let marker = SignatureMarker::dwarf_fortress();
    let resolution = resolve(&launcher_dir, &marker, DEFAULT_MAX_ASCENT).unwrap();

    assert!(matches!(
        resolution,
        Resolution::Resolved(root) if root.install_dir == near && root.base_dir == parent
    ));
}

#[test]
fn exceeding_ascent_bound_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut deep = utf8_dir(&temp_dir);
    for i in 0..6 {
        deep = deep.join(format!("nested{i}"));
    }
    fs::create_dir_all(&deep).unwrap();

    let marker = SignatureMarker::dwarf_fortress();
    let err = resolve(&deep, &marker, 3).unwrap_err();

    assert!(matches!(err, ResolveError::NotFound(3)));
    assert_eq!(
        err.to_string(),
        "no game installation found within 3 ancestor levels"
    );
}

#[test]
fn resolved_root_exposes_support_tree_paths() {
    let temp_dir = TempDir::new().unwrap();
    let base = utf8_dir(&temp_dir);
    make_install(&base, "df");
    fs::create_dir_all(base.join("LNP").join("Utilities")).unwrap();
    fs::create_dir_all(base.join("LNP").join("Colors")).unwrap();

    let marker = SignatureMarker::dwarf_fortress();
    let Resolution::Resolved(root) = resolve(&base, &marker, DEFAULT_MAX_ASCENT).unwrap()
    else {
        panic!("expected resolved root");
    };

    assert_eq!(root.support_dir(), Some(base.join("LNP")));
    assert_eq!(
        root.utilities_dir(),
        Some(base.join("LNP").join("Utilities"))
    );
    assert_eq!(root.colors_dir(), Some(base.join("LNP").join("Colors")));
}
