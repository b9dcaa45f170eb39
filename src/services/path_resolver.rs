//! Base-directory and game-installation resolution.
//!
//! Starting from the launcher's own directory, the resolver walks ancestor
//! directories looking for plausible game installations among their
//! immediate children. The first ancestor level with any candidates stops
//! the search and becomes the base directory. A single candidate resolves
//! immediately; several become a disambiguation set the frontend must pick
//! from via [`finalize`] — a two-phase API, never a blocking prompt.
//!
//! What counts as an installation is a pluggable predicate
//! ([`InstallMarker`]) because historical layouts differ; the standard
//! [`SignatureMarker`] checks for a recognizable subtree such as
//! `data/init`.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::models::InitFile;

/// Folder holding the pack's support tree (rule files, color schemes,
/// graphics packs) under the base directory.
pub const SUPPORT_TREE: &str = "LNP";

/// Ancestor levels searched before resolution gives up.
pub const DEFAULT_MAX_ASCENT: usize = 5;

/// Pluggable predicate deciding whether a directory is a plausible game
/// installation root.
pub trait InstallMarker {
    fn is_install_root(&self, dir: &Utf8Path) -> bool;
}

/// Marker matching a directory that contains any of a set of signature
/// paths. Signature components accept the canonical case or an
/// all-lowercase variant, and no other casing.
#[derive(Debug, Clone)]
pub struct SignatureMarker {
    signatures: Vec<String>,
}

impl SignatureMarker {
    pub fn new<I, S>(signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signatures: signatures.into_iter().map(Into::into).collect(),
        }
    }

    /// The standard Dwarf Fortress signature: a `data/init` subtree.
    pub fn dwarf_fortress() -> Self {
        Self::new(["data/init"])
    }
}

impl InstallMarker for SignatureMarker {
    fn is_install_root(&self, dir: &Utf8Path) -> bool {
        self.signatures
            .iter()
            .any(|sig| locate_case_flexible(dir, sig).is_some())
    }
}

/// Errors that can occur during resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no game installation found within {0} ancestor levels")]
    NotFound(usize),
}

/// The chosen base directory and game-installation directory. These may
/// differ: the base is the ancestor carrying the support tree, the install
/// directory is the child satisfying the marker check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    pub base_dir: Utf8PathBuf,
    pub install_dir: Utf8PathBuf,
}

impl ResolvedRoot {
    /// The `LNP` support tree under the base directory, case-flexible.
    pub fn support_dir(&self) -> Option<Utf8PathBuf> {
        identify_folder(&self.base_dir, SUPPORT_TREE)
    }

    pub fn utilities_dir(&self) -> Option<Utf8PathBuf> {
        identify_folder(&self.support_dir()?, "Utilities")
    }

    pub fn colors_dir(&self) -> Option<Utf8PathBuf> {
        identify_folder(&self.support_dir()?, "Colors")
    }

    /// The game's `data/init` directory.
    pub fn init_dir(&self) -> Utf8PathBuf {
        locate_case_flexible(&self.install_dir, "data/init")
            .unwrap_or_else(|| self.install_dir.join("data").join("init"))
    }

    pub fn init_file(&self, file: InitFile) -> Utf8PathBuf {
        self.init_dir().join(file.file_name())
    }
}

/// Outcome of a resolution run: either a single resolved root, or the
/// candidate set the frontend must disambiguate (never both).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedRoot),
    Ambiguous {
        base_dir: Utf8PathBuf,
        candidates: Vec<Utf8PathBuf>,
    },
}

/// Resolve the game installation starting from `start` (the launcher's own
/// directory).
///
/// Exactly one resolved root is chosen per run. The search stops at the
/// first ancestor level with any candidates, even if deeper levels would
/// also match; exceeding `max_ascent` without candidates is fatal to
/// launcher startup and not retried.
pub fn resolve(
    start: &Utf8Path,
    marker: &dyn InstallMarker,
    max_ascent: usize,
) -> Result<Resolution, ResolveError> {
    let mut level_dir = start.to_path_buf();

    for level in 0..=max_ascent {
        let mut candidates = install_candidates(&level_dir, marker);
        if !candidates.is_empty() {
            tracing::info!(
                "Found {} installation candidate(s) under {} (ancestor level {})",
                candidates.len(),
                level_dir,
                level
            );
            return Ok(if candidates.len() == 1 {
                Resolution::Resolved(ResolvedRoot {
                    base_dir: level_dir,
                    install_dir: candidates.remove(0),
                })
            } else {
                Resolution::Ambiguous {
                    base_dir: level_dir,
                    candidates,
                }
            });
        }

        match level_dir.parent() {
            Some(parent) => level_dir = parent.to_path_buf(),
            // Filesystem root: nowhere further to ascend.
            None => break,
        }
    }

    Err(ResolveError::NotFound(max_ascent))
}

/// Complete the two-phase API after the frontend picked one of the
/// candidates from [`Resolution::Ambiguous`].
pub fn finalize(base_dir: &Utf8Path, choice: &Utf8Path) -> ResolvedRoot {
    ResolvedRoot {
        base_dir: base_dir.to_path_buf(),
        install_dir: choice.to_path_buf(),
    }
}

/// Plausible installation roots among the immediate children of `dir`,
/// sorted by name for deterministic disambiguation sets.
fn install_candidates(dir: &Utf8Path, marker: &dyn InstallMarker) -> Vec<Utf8PathBuf> {
    let mut candidates = Vec::new();

    let entries = match dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot enumerate {}: {}", dir, e);
            return candidates;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", dir, e);
                continue;
            }
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && marker.is_install_root(entry.path()) {
            candidates.push(entry.path().to_path_buf());
        }
    }

    candidates.sort();
    candidates
}

/// Look up `name` under `parent`, accepting the canonical case or the
/// all-lowercase variant — a narrow allowance for case-sensitive
/// filesystems, not general case-folding.
pub fn identify_folder(parent: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    let canonical = parent.join(name);
    if canonical.exists() {
        return Some(canonical);
    }
    let lower = parent.join(name.to_lowercase());
    if lower != canonical && lower.exists() {
        return Some(lower);
    }
    None
}

fn locate_case_flexible(base: &Utf8Path, relative: &str) -> Option<Utf8PathBuf> {
    let mut current = base.to_path_buf();
    for component in relative.split('/') {
        current = identify_folder(&current, component)?;
    }
    Some(current)
}
