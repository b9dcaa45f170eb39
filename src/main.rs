//! dflnp - Lazy Newb Pack launcher core for Dwarf Fortress
//!
//! Headless frontend: resolves the game installation, classifies the
//! pack's utilities and prints the result. The interactive GUI lives in a
//! separate frontend crate and consumes the same library surface.
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/dflnp.<date>
//! 2. Resolve the base directory and game installation starting from the
//!    current directory (on ambiguity this frontend takes the first
//!    candidate after listing them all)
//! 3. Load the pack manifest from the base directory
//! 4. Parse the rule files and classify the Utilities tree
//! 5. Print every utility entry and log accumulated diagnostics

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use dflnp::services::path_resolver::{self, DEFAULT_MAX_ASCENT, Resolution, SignatureMarker};
use dflnp::services::rules::RuleFileParser;
use dflnp::services::utilities::{DisplayOptions, PlatformPatterns, classify};
use dflnp::{APP_NAME, ConfigManager, VERSION};

fn main() -> Result<()> {
    let _guard = dflnp::logging::setup_logging(Utf8Path::new("logs"), false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let start = Utf8PathBuf::try_from(std::env::current_dir()?)?;
    let marker = SignatureMarker::dwarf_fortress();

    // ResolveError::NotFound is fatal to startup; bubble it to the exit code.
    let root = match path_resolver::resolve(&start, &marker, DEFAULT_MAX_ASCENT)? {
        Resolution::Resolved(root) => root,
        Resolution::Ambiguous {
            base_dir,
            candidates,
        } => {
            tracing::warn!(
                "{} installation candidates under {}; an interactive frontend would ask",
                candidates.len(),
                base_dir
            );
            for candidate in &candidates {
                println!("candidate: {candidate}");
            }
            path_resolver::finalize(&base_dir, &candidates[0])
        }
    };

    tracing::info!(
        "Resolved base {} with installation {}",
        root.base_dir,
        root.install_dir
    );

    let manager = ConfigManager::new(&root.base_dir);
    let manifest = manager.load_manifest()?;

    let Some(utilities_dir) = root.utilities_dir() else {
        tracing::warn!("No Utilities folder under {}; nothing to classify", root.base_dir);
        return Ok(());
    };

    let parser = RuleFileParser::new();
    let (rules, mut diagnostics) = parser.load_standard(&utilities_dir);

    let scan = classify(
        &utilities_dir,
        &PlatformPatterns::for_host(),
        &rules,
        DisplayOptions::from_manifest(&manifest),
    );
    diagnostics.extend(scan.diagnostics);

    for entry in &scan.entries {
        match &entry.tooltip {
            Some(tooltip) => println!("{}\t{}\t{}", entry.title, entry.path, tooltip),
            None => println!("{}\t{}", entry.title, entry.path),
        }
    }
    for diagnostic in &diagnostics {
        tracing::warn!("{diagnostic}");
    }

    tracing::info!(
        "Done: {} utilities, {} diagnostics",
        scan.entries.len(),
        diagnostics.len()
    );
    Ok(())
}
