//! Services module - Pure business logic of the launcher core.
//!
//! Everything with genuine decision logic lives here, framework-agnostic
//! and free of UI dependencies:
//!
//! - [`path_resolver`]: finds the game installation among ambiguous
//!   candidates by walking ancestor directories; two-phase API for
//!   disambiguation.
//! - [`rules`]: parses the three bracket-delimited rule files
//!   (exclude/include/relabel) and evaluates the ordered precedence
//!   pipeline.
//! - [`utilities`]: scans the `Utilities` tree for platform-appropriate
//!   executables and produces the final ordered, de-duplicated list.
//! - [`config_patch`]: loads, merges and atomically writes the game's flat
//!   `KEY=VALUE` configuration files, version-aware.
//! - [`colors`]: color-scheme listing and installation on top of the
//!   patcher.
//!
//! # Design Philosophy
//!
//! - **Pure**: each call is a function of filesystem state plus explicit
//!   inputs; no ambient configuration, no shared mutable state.
//! - **Synchronous**: every operation is a bounded scan or text transform;
//!   callers wanting responsiveness run them from a background worker.
//! - **Best-effort**: per-entry failures accumulate into diagnostics lists
//!   beside the primary result instead of aborting the whole operation.

pub mod colors;
pub mod config_patch;
pub mod path_resolver;
pub mod rules;
pub mod utilities;

pub use config_patch::{
    ConfigDocument, MergeOutcome, ParseMode, PatchError, load_document, merge_override,
    write_document,
};
pub use path_resolver::{
    InstallMarker, Resolution, ResolveError, ResolvedRoot, SignatureMarker, resolve,
};
pub use rules::{RuleFileParser, RuleOutcome, RuleSet};
pub use utilities::{DisplayOptions, PlatformPatterns, UtilityEntry, UtilityScan, classify};
