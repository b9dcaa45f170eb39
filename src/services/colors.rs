//! Color scheme management.
//!
//! Schemes live as `KEY=VALUE` files in the pack's `LNP/Colors` folder,
//! each carrying the 48 color component keys (`<NAME>_R/_G/_B` for the 16
//! palette colors). Where the scheme ends up depends on the schema version:
//! the Legacy format keeps colors inside `init.txt`, so installing merges
//! the component keys through the config patcher; the Split format has a
//! dedicated `colors.txt` that is simply replaced.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

use crate::fsutil;
use crate::models::{COLOR_NAMES, Diagnostic, InitFile, SchemaVersion, color_component_keys};
use crate::services::config_patch::{
    ConfigDocument, MergeOutcome, ParseMode, load_document, merge_override, write_document,
};
use crate::services::path_resolver::ResolvedRoot;

/// One palette color as RGB components.
pub type Rgb = (u8, u8, u8);

/// Sorted scheme names (file stems) available under the Colors folder.
pub fn list_schemes(colors_dir: &Utf8Path) -> Vec<String> {
    let mut schemes = Vec::new();

    let entries = match colors_dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot enumerate color schemes in {}: {}", colors_dir, e);
            return schemes;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension() == Some("txt")
            && let Some(stem) = path.file_stem()
        {
            schemes.push(stem.to_string());
        }
    }

    schemes.sort();
    schemes
}

/// Path of scheme `name` in the Colors folder, `.txt` appended when missing.
pub fn scheme_path(colors_dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    if name.ends_with(".txt") {
        colors_dir.join(name)
    } else {
        colors_dir.join(format!("{name}.txt"))
    }
}

pub fn scheme_exists(colors_dir: &Utf8Path, name: &str) -> bool {
    scheme_path(colors_dir, name).exists()
}

pub fn delete_scheme(colors_dir: &Utf8Path, name: &str) -> Result<()> {
    let path = scheme_path(colors_dir, name);
    tracing::info!("Deleting color scheme {}", path);
    fs::remove_file(&path).with_context(|| format!("Failed to delete color scheme {path}"))
}

/// The 16 RGB triples held by `document`, in palette order, or `None` when
/// any component is missing or out of range.
pub fn scheme_colors(document: &ConfigDocument) -> Option<Vec<Rgb>> {
    COLOR_NAMES
        .iter()
        .map(|name| {
            let component = |c: &str| -> Option<u8> {
                document.get(&format!("{name}_{c}"))?.parse().ok()
            };
            Some((component("R")?, component("G")?, component("B")?))
        })
        .collect()
}

/// The colors currently installed in the game's configuration.
pub fn current_colors(root: &ResolvedRoot, version: SchemaVersion) -> Result<Vec<Rgb>> {
    let path = live_colors_path(root, version);
    let (document, _) = load_document(&path, ParseMode::Lenient)
        .with_context(|| format!("Failed to load current colors from {path}"))?;
    scheme_colors(&document).ok_or_else(|| anyhow!("incomplete color data in {path}"))
}

/// Install scheme `name` into the game's configuration.
///
/// Legacy: merge the component keys into `init.txt` through the patcher
/// (rejected keys are returned as diagnostics). Split: atomically replace
/// `data/init/colors.txt` with the scheme file.
pub fn install_scheme(
    root: &ResolvedRoot,
    colors_dir: &Utf8Path,
    name: &str,
    version: SchemaVersion,
) -> Result<Vec<Diagnostic>> {
    let source = scheme_path(colors_dir, name);
    tracing::info!("Installing color scheme {}", source);

    match version {
        SchemaVersion::Legacy => {
            let (scheme, _) = load_document(&source, ParseMode::Lenient)
                .with_context(|| format!("Failed to load color scheme {source}"))?;

            // Only the color components of the scheme participate.
            let mut fragment = ConfigDocument::default();
            for key in color_component_keys() {
                if let Some(value) = scheme.get(&key) {
                    fragment.set(&key, value);
                }
            }

            let target = root.init_file(InitFile::Init);
            let (base, _) = load_document(&target, ParseMode::Lenient)
                .with_context(|| format!("Failed to load {target}"))?;

            match merge_override(&base, &fragment, version, InitFile::Init) {
                MergeOutcome::Applied {
                    document,
                    diagnostics,
                } => {
                    write_document(&target, &document)?;
                    Ok(diagnostics)
                }
                MergeOutcome::NotApplicable { .. } => {
                    Err(anyhow!("color merge not applicable for {version:?}"))
                }
            }
        }
        SchemaVersion::Split => {
            let contents = fs::read_to_string(&source)
                .with_context(|| format!("Failed to read color scheme {source}"))?;
            let target = live_colors_path(root, version);
            fsutil::atomic_write_str(&target, &contents)?;
            Ok(Vec::new())
        }
    }
}

/// Save the currently installed colors as scheme `name`.
///
/// Only the Split format keeps a standalone `colors.txt` to copy; exporting
/// from a Legacy `init.txt` is not supported.
pub fn save_scheme(
    root: &ResolvedRoot,
    colors_dir: &Utf8Path,
    name: &str,
    version: SchemaVersion,
) -> Result<()> {
    if version == SchemaVersion::Legacy {
        return Err(anyhow!(
            "exporting color schemes is not supported for the Legacy format"
        ));
    }

    let source = live_colors_path(root, version);
    let target = scheme_path(colors_dir, name);
    tracing::info!("Saving color scheme {}", target);

    let contents = fs::read_to_string(&source)
        .with_context(|| format!("Failed to read current colors from {source}"))?;
    fsutil::atomic_write_str(&target, &contents)
}

/// The stored scheme matching the currently installed colors, if any.
pub fn installed_scheme(
    root: &ResolvedRoot,
    colors_dir: &Utf8Path,
    version: SchemaVersion,
) -> Option<String> {
    let current = current_colors(root, version).ok()?;

    for name in list_schemes(colors_dir) {
        let path = scheme_path(colors_dir, &name);
        let Ok((document, _)) = load_document(&path, ParseMode::Lenient) else {
            continue;
        };
        if scheme_colors(&document).as_deref() == Some(current.as_slice()) {
            return Some(name);
        }
    }
    None
}

fn live_colors_path(root: &ResolvedRoot, version: SchemaVersion) -> Utf8PathBuf {
    match version {
        SchemaVersion::Legacy => root.init_file(InitFile::Init),
        SchemaVersion::Split => root.init_dir().join("colors.txt"),
    }
}
