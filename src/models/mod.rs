//! Data models for the dflnp launcher core.
//!
//! This module contains the data structures shared across services:
//! - [`PackManifest`]: pack-supplied menu entries, display toggles and hooks from `lnp.yaml`
//! - [`UserSettings`]: user preferences loaded from and saved to `lnp-user.yaml`
//! - [`SchemaVersion`]/[`InitFile`]: historical configuration-file formats and their declared key sets
//! - [`Diagnostic`]: accumulated per-entry problems returned beside primary results
//!
//! # Architecture Note
//!
//! Configuration models derive `Serialize`/`Deserialize` for YAML persistence;
//! everything else is plain data. Services take these by reference so each
//! call stays a pure function of filesystem state plus explicit inputs.

pub mod diagnostics;
pub mod manifest;
pub mod schema;

pub use diagnostics::Diagnostic;
pub use manifest::{MenuEntry, PackManifest, UpdateCheck, UserSettings};
pub use schema::{COLOR_NAMES, InitFile, SchemaVersion, color_component_keys};
