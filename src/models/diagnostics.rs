use camino::Utf8PathBuf;
use std::fmt;

/// A non-fatal, per-entry problem accumulated during a scan, parse or merge.
///
/// The services never abort on these; they are collected beside the primary
/// result so a single bad rule line or unreadable file still yields a
/// best-effort outcome. The frontend decides how loudly to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A rule-file line contained an unbalanced bracket entry and was skipped.
    RuleParseSkipped {
        file: String,
        line: usize,
        raw: String,
    },

    /// A directory entry could not be read during the utilities scan.
    ScanEntryUnreadable {
        path: Utf8PathBuf,
        error: String,
    },

    /// A patch-fragment key fell outside the declared schema and was not applied.
    SchemaKeyRejected {
        key: String,
    },

    /// A malformed configuration line was preserved verbatim (lenient parse).
    MalformedLineKept {
        line: usize,
        raw: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RuleParseSkipped { file, line, raw } => {
                write!(f, "{file}:{line}: skipped malformed rule entry: {raw:?}")
            }
            Diagnostic::ScanEntryUnreadable { path, error } => {
                write!(f, "unreadable entry {path}: {error}")
            }
            Diagnostic::SchemaKeyRejected { key } => {
                write!(f, "patch key {key} is outside the declared schema and was not applied")
            }
            Diagnostic::MalformedLineKept { line, raw } => {
                write!(f, "line {line}: kept malformed configuration line: {raw:?}")
            }
        }
    }
}
