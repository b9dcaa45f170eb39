use crate::fsutil;
use crate::models::{PackManifest, UserSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for the launcher's own YAML files.
///
/// Manages two files in the resolved base directory:
/// - Pack manifest (`lnp.yaml`): menu entries, display toggles, update
///   parameters, command hooks. Pack-supplied, read-only.
/// - User settings (`lnp-user.yaml`): terminal command, auto-close,
///   autorun list. Read and written by the launcher.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: Utf8PathBuf,
    manifest_path: Utf8PathBuf,
    user_settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at the resolved base directory.
    pub fn new<P: AsRef<Utf8Path>>(base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            manifest_path: base_dir.join("lnp.yaml"),
            user_settings_path: base_dir.join("lnp-user.yaml"),
            base_dir,
        }
    }

    /// Load the pack manifest, or defaults if the file doesn't exist.
    pub fn load_manifest(&self) -> Result<PackManifest> {
        if !self.manifest_path.exists() {
            tracing::warn!(
                "Pack manifest not found at {}, using defaults",
                self.manifest_path
            );
            return Ok(PackManifest::default());
        }

        let file_contents = fs::read_to_string(&self.manifest_path)
            .with_context(|| format!("Failed to read pack manifest: {}", self.manifest_path))?;

        let manifest: PackManifest = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse pack manifest: {}", self.manifest_path))?;

        tracing::info!("Loaded pack manifest from {}", self.manifest_path);
        Ok(manifest)
    }

    /// Load the user settings, or defaults if the file doesn't exist.
    pub fn load_user_settings(&self) -> Result<UserSettings> {
        if !self.user_settings_path.exists() {
            tracing::warn!(
                "User settings not found at {}, using defaults",
                self.user_settings_path
            );
            return Ok(UserSettings::default());
        }

        let file_contents = fs::read_to_string(&self.user_settings_path).with_context(|| {
            format!("Failed to read user settings: {}", self.user_settings_path)
        })?;

        let settings: UserSettings = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse user settings: {}", self.user_settings_path)
        })?;

        tracing::info!("Loaded user settings from {}", self.user_settings_path);
        Ok(settings)
    }

    /// Save the user settings atomically.
    pub fn save_user_settings(&self, settings: &UserSettings) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(settings)
            .context("Failed to serialize user settings to YAML")?;

        fsutil::atomic_write_str(&self.user_settings_path, &yaml_string)?;

        tracing::info!("Saved user settings to {}", self.user_settings_path);
        Ok(())
    }

    /// Get the base directory path.
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }
}
