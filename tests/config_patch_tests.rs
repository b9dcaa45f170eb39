//! On-disk configuration patching tests
//!
//! The unit tests cover the parser and merge in memory; these verify the
//! disk-facing contract: load → merge → atomic write, strict-mode aborts
//! leaving the target untouched, and the byte-identity / idempotence
//! properties over generated documents.

use camino::Utf8PathBuf;
use dflnp::models::{Diagnostic, InitFile, SchemaVersion};
use dflnp::services::config_patch::{
    ConfigDocument, MergeOutcome, ParseMode, PatchError, load_document, merge_override,
    write_document,
};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
}

#[test]
fn load_merge_write_round_trip_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let dir = utf8_dir(&temp_dir);
    let init = dir.join("init.txt");
    let fragment = dir.join("fragment.txt");

    fs::write(
        &init,
        "# Display settings\nFONT=curses_640x300.png\nSOUND=YES\n\nINTRO=YES\n",
    )
    .unwrap();
    fs::write(&fragment, "SOUND=NO\nTRUETYPE=YES\n").unwrap();

    let (base, _) = load_document(&init, ParseMode::Lenient).unwrap();
    let (patch, _) = load_document(&fragment, ParseMode::Strict).unwrap();

    let MergeOutcome::Applied {
        document,
        diagnostics,
    } = merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init)
    else {
        panic!("expected applied merge");
    };
    assert!(diagnostics.is_empty());

    write_document(&init, &document).unwrap();

    let written = fs::read_to_string(&init).unwrap();
    // Untouched lines byte-identical, SOUND replaced, TRUETYPE appended.
    assert_eq!(
        written,
        "# Display settings\nFONT=curses_640x300.png\nSOUND=NO\n\nINTRO=YES\nTRUETYPE=YES\n"
    );
}

#[test]
fn strict_load_failure_leaves_target_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let dir = utf8_dir(&temp_dir);
    let init = dir.join("init.txt");
    let original = "FONT=x\nthis line is broken\nSOUND=YES\n";
    fs::write(&init, original).unwrap();

    let err = load_document(&init, ParseMode::Strict).unwrap_err();
    assert!(matches!(err, PatchError::Parse { line: 2, .. }));

    // Nothing was consumed, nothing was written.
    assert_eq!(fs::read_to_string(&init).unwrap(), original);
    let leftovers: Vec<_> = dir
        .read_dir_utf8()
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn missing_file_is_a_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = utf8_dir(&temp_dir).join("absent.txt");

    let err = load_document(&path, ParseMode::Lenient).unwrap_err();
    assert!(matches!(err, PatchError::Read { .. }));
}

#[test]
fn lenient_merge_preserves_malformed_lines_through_write() {
    let temp_dir = TempDir::new().unwrap();
    let init = utf8_dir(&temp_dir).join("init.txt");
    fs::write(&init, "FONT=a\n[legacy bracket noise]\nSOUND=YES\n").unwrap();

    let (base, diagnostics) = load_document(&init, ParseMode::Lenient).unwrap();
    assert!(matches!(
        &diagnostics[..],
        [Diagnostic::MalformedLineKept { line: 2, .. }]
    ));

    let (patch, _) = ConfigDocument::parse(
        "SOUND=NO\n",
        ParseMode::Strict,
        camino::Utf8Path::new("fragment"),
    )
    .unwrap();
    let MergeOutcome::Applied { document, .. } =
        merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init)
    else {
        panic!("expected applied merge");
    };
    write_document(&init, &document).unwrap();

    assert_eq!(
        fs::read_to_string(&init).unwrap(),
        "FONT=a\n[legacy bracket noise]\nSOUND=NO\n"
    );
}

fn schema_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("FONT".to_string()),
        Just("SOUND".to_string()),
        Just("INTRO".to_string()),
        Just("TRUETYPE".to_string()),
        Just("WINDOWEDX".to_string()),
        Just("WINDOWEDY".to_string()),
    ]
}

fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.]{1,12}"
}

fn document_text() -> impl Strategy<Value = String> {
    prop::collection::vec((schema_key(), value()), 0..6).prop_map(|pairs| {
        let mut text = String::new();
        for (key, val) in pairs {
            text.push_str(&key);
            text.push('=');
            text.push_str(&val);
            text.push('\n');
        }
        text
    })
}

proptest! {
    /// Parsing then rendering a well-formed document changes nothing.
    #[test]
    fn parse_render_is_identity_for_well_formed_text(text in document_text()) {
        let (doc, diagnostics) = ConfigDocument::parse(
            &text,
            ParseMode::Strict,
            camino::Utf8Path::new("gen.txt"),
        ).unwrap();
        prop_assert!(diagnostics.is_empty());
        prop_assert_eq!(doc.render(), text);
    }

    /// Applying the same fragment twice equals applying it once.
    #[test]
    fn merge_is_idempotent(base in document_text(), fragment in document_text()) {
        let origin = camino::Utf8Path::new("gen.txt");
        let (base, _) = ConfigDocument::parse(&base, ParseMode::Strict, origin).unwrap();
        let (patch, _) = ConfigDocument::parse(&fragment, ParseMode::Strict, origin).unwrap();

        let MergeOutcome::Applied { document: once, .. } =
            merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init)
        else {
            panic!("expected applied merge");
        };
        let MergeOutcome::Applied { document: twice, .. } =
            merge_override(&once, &patch, SchemaVersion::Split, InitFile::Init)
        else {
            panic!("expected applied merge");
        };

        prop_assert_eq!(once.render(), twice.render());
    }

    /// Keys the fragment does not mention render byte-identically.
    #[test]
    fn merge_preserves_unmentioned_base_lines(base in document_text()) {
        let origin = camino::Utf8Path::new("gen.txt");
        let (base_doc, _) = ConfigDocument::parse(&base, ParseMode::Strict, origin).unwrap();
        let empty = ConfigDocument::default();

        let MergeOutcome::Applied { document, .. } =
            merge_override(&base_doc, &empty, SchemaVersion::Split, InitFile::Init)
        else {
            panic!("expected applied merge");
        };

        prop_assert_eq!(document.render(), base);
    }
}
