//! Configuration patch-merging.
//!
//! A pack fragment (a graphics set's settings, a color scheme, a default
//! config) is a partial `KEY=VALUE` document applied onto one of the game's
//! own configuration files. A merge must preserve every key the fragment
//! does not mention — byte-identically, comments and all — and must refuse
//! keys outside the declared schema for the target version, so a newer
//! pack's fragment is never silently applied against an older game (or the
//! reverse).
//!
//! Documents are read fresh for each operation and written back atomically;
//! the live file the game might be reading is never mutated in place.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use thiserror::Error;

use crate::fsutil;
use crate::models::{Diagnostic, InitFile, SchemaVersion};

/// Errors that can occur while loading or committing a document.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("{path}:{line}: not a KEY=VALUE assignment: {raw:?}")]
    Parse {
        path: Utf8PathBuf,
        line: usize,
        raw: String,
    },

    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How strictly [`load_document`] treats malformed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail on the first malformed line, before anything is consumed.
    Strict,
    /// Keep malformed lines as opaque pass-through and report them; the
    /// document stays usable for merges that do not touch them.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// A parsed assignment. `raw` holds the original text until the value
    /// is replaced, so untouched pairs round-trip byte-identically.
    Pair {
        key: String,
        value: String,
        raw: Option<String>,
    },
    Comment(String),
    Blank(String),
    Malformed(String),
}

/// An ordered, line-preserving `KEY=VALUE` configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    lines: Vec<Line>,
    index: IndexMap<String, usize>,
}

impl ConfigDocument {
    /// Parse `text` into a document. `origin` only labels errors.
    pub fn parse(
        text: &str,
        mode: ParseMode,
        origin: &Utf8Path,
    ) -> Result<(Self, Vec<Diagnostic>), PatchError> {
        let mut doc = ConfigDocument::default();
        let mut diagnostics = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                doc.lines.push(Line::Blank(raw.to_string()));
                continue;
            }
            if trimmed.starts_with('#') {
                doc.lines.push(Line::Comment(raw.to_string()));
                continue;
            }

            let parsed = raw.split_once('=').and_then(|(key, value)| {
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
            });

            match parsed {
                Some((key, value)) => {
                    doc.index.insert(key.clone(), doc.lines.len());
                    doc.lines.push(Line::Pair {
                        key,
                        value,
                        raw: Some(raw.to_string()),
                    });
                }
                None if mode == ParseMode::Strict => {
                    return Err(PatchError::Parse {
                        path: origin.to_path_buf(),
                        line: line_no,
                        raw: raw.to_string(),
                    });
                }
                None => {
                    tracing::warn!("{}:{}: keeping malformed line {:?}", origin, line_no, raw);
                    diagnostics.push(Diagnostic::MalformedLineKept {
                        line: line_no,
                        raw: raw.to_string(),
                    });
                    doc.lines.push(Line::Malformed(raw.to_string()));
                }
            }
        }

        Ok((doc, diagnostics))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = *self.index.get(key)?;
        match &self.lines[idx] {
            Line::Pair { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Overwrite `key`, or append it at the end when absent. Replaced pairs
    /// lose their original text and re-render as `KEY=VALUE`.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&idx) => {
                self.lines[idx] = Line::Pair {
                    key: key.to_string(),
                    value: value.to_string(),
                    raw: None,
                };
            }
            None => {
                self.index.insert(key.to_string(), self.lines.len());
                self.lines.push(Line::Pair {
                    key: key.to_string(),
                    value: value.to_string(),
                    raw: None,
                });
            }
        }
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Key/value pairs in document order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair { key, value, .. } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Serialize the document. Untouched lines are emitted byte-identically
    /// in original order; replaced and appended pairs render as `KEY=VALUE`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Pair { raw: Some(raw), .. } => out.push_str(raw),
                Line::Pair { key, value, raw: None } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                Line::Comment(raw) | Line::Blank(raw) | Line::Malformed(raw) => {
                    out.push_str(raw)
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Load a configuration document from disk.
pub fn load_document(
    path: &Utf8Path,
    mode: ParseMode,
) -> Result<(ConfigDocument, Vec<Diagnostic>), PatchError> {
    let text = fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigDocument::parse(&text, mode, path)
}

/// Outcome of [`merge_override`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merged document plus the rejected-key diagnostics. The merge
    /// completes for valid keys even when some are rejected.
    Applied {
        document: ConfigDocument,
        diagnostics: Vec<Diagnostic>,
    },
    /// The target version has no such file; nothing was merged.
    NotApplicable {
        version: SchemaVersion,
        file: InitFile,
    },
}

/// Apply a partial override fragment onto a copy of `base`.
///
/// Every fragment key inside the declared schema for `version`/`file`
/// overwrites the base value (or appends, for genuinely new schema keys);
/// keys outside the declared set are reported, not applied. Base keys the
/// fragment does not mention carry through unchanged, in original order.
pub fn merge_override(
    base: &ConfigDocument,
    patch: &ConfigDocument,
    version: SchemaVersion,
    file: InitFile,
) -> MergeOutcome {
    let Some(declared) = version.declared_keys(file) else {
        tracing::info!(
            "Merge into {} not applicable for {:?}",
            file.file_name(),
            version
        );
        return MergeOutcome::NotApplicable { version, file };
    };

    let mut document = base.clone();
    let mut diagnostics = Vec::new();

    for (key, value) in patch.pairs() {
        if declared.contains(key) {
            document.set(key, value);
        } else {
            tracing::warn!(
                "Rejecting patch key {} (outside {:?} schema for {})",
                key,
                version,
                file.file_name()
            );
            diagnostics.push(Diagnostic::SchemaKeyRejected {
                key: key.to_string(),
            });
        }
    }

    MergeOutcome::Applied {
        document,
        diagnostics,
    }
}

/// Write a document back to disk atomically (sibling temp file + rename),
/// so a crash mid-write never corrupts the live configuration.
pub fn write_document(path: &Utf8Path, document: &ConfigDocument) -> anyhow::Result<()> {
    fsutil::atomic_write_str(path, &document.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Utf8Path {
        Utf8Path::new("init.txt")
    }

    fn parse_lenient(text: &str) -> ConfigDocument {
        ConfigDocument::parse(text, ParseMode::Lenient, origin()).unwrap().0
    }

    #[test]
    fn test_parse_pairs_comments_blanks() {
        let text = "# Display settings\n\nFONT=curses_640x300.png\nFPS = YES\n";
        let (doc, diagnostics) =
            ConfigDocument::parse(text, ParseMode::Strict, origin()).unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("FONT"), Some("curses_640x300.png"));
        assert_eq!(doc.get("FPS"), Some("YES"));
    }

    #[test]
    fn test_strict_mode_fails_on_malformed_line() {
        let text = "FONT=x\nnot an assignment\n";
        let err = ConfigDocument::parse(text, ParseMode::Strict, origin()).unwrap_err();
        match err {
            PatchError::Parse { line, raw, .. } => {
                assert_eq!(line, 2);
                assert_eq!(raw, "not an assignment");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_mode_keeps_malformed_line_verbatim() {
        let text = "FONT=x\ngarbage line\nSOUND=NO\n";
        let (doc, diagnostics) =
            ConfigDocument::parse(text, ParseMode::Lenient, origin()).unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::MalformedLineKept { line: 2, raw } if raw == "garbage line"
        ));
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn test_render_preserves_untouched_lines_byte_identically() {
        let text = "# header\nFONT = spaced.png\n\nSOUND=YES\n";
        let mut doc = parse_lenient(text);
        doc.set("SOUND", "NO");

        assert_eq!(doc.render(), "# header\nFONT = spaced.png\n\nSOUND=NO\n");
    }

    #[test]
    fn test_set_appends_new_key_at_end() {
        let mut doc = parse_lenient("FONT=x\n");
        doc.set("TRUETYPE", "YES");

        assert_eq!(doc.render(), "FONT=x\nTRUETYPE=YES\n");
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["FONT", "TRUETYPE"]);
    }

    #[test]
    fn test_merge_overwrites_declared_keys_and_rejects_others() {
        // Base {A=1,B=2,C=3} with schema keys {A,B,C,D}: patch {B=20,D=40}
        // merges, {Z=99} is rejected. Expressed with the Split init.txt
        // schema.
        let base = parse_lenient("FONT=1\nSOUND=2\nINTRO=3\n");
        let patch = parse_lenient("SOUND=20\nTRUETYPE=40\nNOT_A_KEY=99\n");

        let outcome = merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init);
        let MergeOutcome::Applied {
            document,
            diagnostics,
        } = outcome
        else {
            panic!("expected applied merge");
        };

        assert_eq!(document.get("FONT"), Some("1"));
        assert_eq!(document.get("SOUND"), Some("20"));
        assert_eq!(document.get("INTRO"), Some("3"));
        assert_eq!(document.get("TRUETYPE"), Some("40"));
        assert_eq!(document.get("NOT_A_KEY"), None);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SchemaKeyRejected {
                key: "NOT_A_KEY".to_string()
            }]
        );
    }

    #[test]
    fn test_merge_preserves_original_order() {
        let base = parse_lenient("FONT=a\nSOUND=b\nINTRO=c\n");
        let patch = parse_lenient("SOUND=B\n");

        let MergeOutcome::Applied { document, .. } =
            merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init)
        else {
            panic!("expected applied merge");
        };

        assert_eq!(
            document.keys().collect::<Vec<_>>(),
            ["FONT", "SOUND", "INTRO"]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let base = parse_lenient("FONT=a\nSOUND=b\n");
        let patch = parse_lenient("SOUND=loud\nTRUETYPE=YES\n");

        let MergeOutcome::Applied { document: once, .. } =
            merge_override(&base, &patch, SchemaVersion::Split, InitFile::Init)
        else {
            panic!()
        };
        let MergeOutcome::Applied { document: twice, .. } =
            merge_override(&once, &patch, SchemaVersion::Split, InitFile::Init)
        else {
            panic!()
        };

        assert_eq!(once, twice);
    }

    #[test]
    fn test_legacy_d_init_merge_not_applicable() {
        let base = ConfigDocument::default();
        let patch = parse_lenient("POPULATION_CAP=80\n");

        let outcome = merge_override(&base, &patch, SchemaVersion::Legacy, InitFile::DInit);
        assert_eq!(
            outcome,
            MergeOutcome::NotApplicable {
                version: SchemaVersion::Legacy,
                file: InitFile::DInit,
            }
        );
    }

    #[test]
    fn test_legacy_init_accepts_color_and_gameplay_keys() {
        let base = parse_lenient("FONT=a\n");
        let patch = parse_lenient("BLACK_R=0\nPOPULATION_CAP=80\n");

        let MergeOutcome::Applied {
            document,
            diagnostics,
        } = merge_override(&base, &patch, SchemaVersion::Legacy, InitFile::Init)
        else {
            panic!()
        };

        assert!(diagnostics.is_empty());
        assert_eq!(document.get("BLACK_R"), Some("0"));
        assert_eq!(document.get("POPULATION_CAP"), Some("80"));
    }
}
