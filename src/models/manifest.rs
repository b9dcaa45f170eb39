use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pack manifest from `lnp.yaml` in the base directory.
///
/// Supplied by the pack author, never written by the launcher. Carries the
/// GUI menu entries, the utility-display toggles consumed by the classifier,
/// update-check parameters, and the toggleable command hooks (stored as
/// opaque data; the core never interprets hook semantics).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackManifest {
    /// Folder shortcuts shown in the GUI menu, targets relative to the root.
    #[serde(default)]
    pub folders: Vec<MenuEntry>,

    /// Web links shown in the GUI menu.
    #[serde(default)]
    pub links: Vec<MenuEntry>,

    #[serde(rename = "hideUtilityPath", default)]
    pub hide_utility_path: bool,

    #[serde(rename = "hideUtilityExt", default)]
    pub hide_utility_ext: bool,

    #[serde(default)]
    pub updates: Option<UpdateCheck>,

    #[serde(default)]
    pub hooks: IndexMap<String, String>,
}

/// A titled menu entry pointing at a folder or URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuEntry {
    pub title: String,
    pub target: String,
}

/// Update-check parameters. The check itself is a single GET plus a regex
/// over the response body, performed by an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCheck {
    pub url: String,

    #[serde(rename = "versionRegex")]
    pub version_regex: String,

    #[serde(rename = "checkIntervalDays", default = "default_check_interval_days")]
    pub check_interval_days: u32,
}

fn default_check_interval_days() -> u32 {
    7
}

/// User settings from `lnp-user.yaml` in the base directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSettings {
    /// Custom terminal command used to launch console utilities on Linux.
    #[serde(default)]
    pub terminal: String,

    /// Close the launcher after starting the game.
    #[serde(rename = "autoClose", default)]
    pub auto_close: bool,

    /// Utility file names started together with the game.
    #[serde(default)]
    pub autorun: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            terminal: String::new(),
            auto_close: false,
            autorun: Vec::new(),
        }
    }
}
