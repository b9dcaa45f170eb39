// dflnp - Lazy Newb Pack launcher core for Dwarf Fortress
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides a headless frontend.

pub mod config;
pub mod fsutil;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{Diagnostic, InitFile, PackManifest, SchemaVersion, UserSettings};
pub use services::{Resolution, ResolvedRoot, RuleSet, UtilityEntry, UtilityScan};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
