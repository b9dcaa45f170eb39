//! Utility classification: turning the raw contents of the pack's
//! `Utilities` tree into the ordered, de-duplicated list of launchable
//! helper programs the frontend presents.
//!
//! Classification is a pure function of its inputs — the directory, the
//! platform's file-type patterns, the parsed rule sets and the display
//! options — so it is trivially testable and can run from a background
//! worker without locks.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use walkdir::WalkDir;

use crate::models::{Diagnostic, PackManifest};
use crate::services::rules::{RuleOutcome, RuleSet};

/// Filename-matching patterns for the active platform's launchable file
/// types. Supplied externally so the classifier stays platform-agnostic;
/// matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct PlatformPatterns {
    set: GlobSet,
}

impl PlatformPatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, globset::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(
                GlobBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()?,
            );
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn windows() -> Self {
        Self::new(["*.exe", "*.jar", "*.bat"]).expect("Invalid windows patterns")
    }

    pub fn linux() -> Self {
        Self::new(["*.jar", "*.sh"]).expect("Invalid linux patterns")
    }

    pub fn macos() -> Self {
        Self::new(["*.app", "*.jar", "*.sh"]).expect("Invalid macos patterns")
    }

    /// Defaults for the platform this launcher was built for.
    pub fn for_host() -> Self {
        if cfg!(target_os = "windows") {
            Self::windows()
        } else if cfg!(target_os = "macos") {
            Self::macos()
        } else {
            Self::linux()
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.set.is_match(filename)
    }
}

/// Display toggles from the pack manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Do not prefix titles with the containing folder name.
    pub hide_path: bool,
    /// Strip the file extension from derived titles.
    pub hide_ext: bool,
}

impl DisplayOptions {
    pub fn from_manifest(manifest: &PackManifest) -> Self {
        Self {
            hide_path: manifest.hide_utility_path,
            hide_ext: manifest.hide_utility_ext,
        }
    }
}

/// One launchable helper program as it will be presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityEntry {
    pub path: Utf8PathBuf,
    pub title: String,
    pub tooltip: Option<String>,
}

/// Classification output: entries in discovery order plus accumulated
/// per-entry diagnostics.
#[derive(Debug, Clone, Default)]
pub struct UtilityScan {
    pub entries: Vec<UtilityEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan the Utilities tree and produce the final utility list.
///
/// Order is traversal order (sorted by file name at every level), stable
/// for a fixed filesystem state. Files whose name begins with `README`
/// (any case) are exempt from classification entirely. Unreadable entries
/// are reported and skipped, never fatal.
pub fn classify(
    utilities_dir: &Utf8Path,
    patterns: &PlatformPatterns,
    rules: &RuleSet,
    display: DisplayOptions,
) -> UtilityScan {
    let mut scan = UtilityScan::default();
    let mut seen: HashSet<Utf8PathBuf> = HashSet::new();

    for item in WalkDir::new(utilities_dir).sort_by_file_name() {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .and_then(|p| Utf8Path::from_path(p))
                    .map(Utf8Path::to_path_buf)
                    .unwrap_or_else(|| utilities_dir.to_path_buf());
                tracing::warn!("Skipping unreadable entry {}: {}", path, e);
                scan.diagnostics.push(Diagnostic::ScanEntryUnreadable {
                    path,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            tracing::warn!("Skipping non-UTF-8 path {}", entry.path().display());
            continue;
        };
        let name = path.file_name().unwrap_or_default();

        // README files are exempt from classification, rules included.
        if name.to_lowercase().starts_with("readme") {
            continue;
        }

        if rules.evaluate(name, patterns.matches(name)) != RuleOutcome::Included {
            continue;
        }

        // Deduplicate by full path; first occurrence wins.
        if !seen.insert(path.to_path_buf()) {
            continue;
        }

        let relabel = rules.relabel(name);
        scan.entries.push(UtilityEntry {
            path: path.to_path_buf(),
            title: display_title(path, utilities_dir, relabel.and_then(|r| r.title.as_deref()), display),
            tooltip: relabel.and_then(|r| r.tooltip.clone()),
        });
    }

    tracing::info!(
        "Classified {} utilities under {} ({} diagnostics)",
        scan.entries.len(),
        utilities_dir,
        scan.diagnostics.len()
    );
    scan
}

/// Derive the display title for one surviving candidate.
///
/// A non-empty relabel title wins outright. Otherwise the title comes from
/// the filename (extension stripped when `hide_ext`), prefixed with the
/// immediate parent folder name when `hide_path` is off and the file is
/// not directly under the scan root.
fn display_title(
    path: &Utf8Path,
    root: &Utf8Path,
    relabel_title: Option<&str>,
    display: DisplayOptions,
) -> String {
    if let Some(title) = relabel_title
        && !title.is_empty()
    {
        return title.to_string();
    }

    let name = path.file_name().unwrap_or_default();
    let base = if display.hide_ext {
        path.file_stem().unwrap_or(name)
    } else {
        name
    };

    if display.hide_path {
        return base.to_string();
    }
    match path.parent() {
        Some(parent) if parent != root => match parent.file_name() {
            Some(folder) => format!("{folder}/{base}"),
            None => base.to_string(),
        },
        _ => base.to_string(),
    }
}
