//! Historical schemas of the game's configuration files.
//!
//! The declared key set differs across known format versions: early Dwarf
//! Fortress releases kept everything (display, gameplay and color settings)
//! in a single `init.txt`, while later releases split gameplay keys into
//! `d_init.txt` and moved colors to a separate `colors.txt`. Patch merges are
//! parameterized by [`SchemaVersion`] so a pack fragment is never applied
//! against a file the target version does not have.

use std::collections::HashSet;
use std::sync::LazyLock;

/// One of the game's flat `KEY=VALUE` configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitFile {
    /// `data/init/init.txt` - display and sound settings.
    Init,
    /// `data/init/d_init.txt` - gameplay settings (Split schema only).
    DInit,
}

impl InitFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            InitFile::Init => "init.txt",
            InitFile::DInit => "d_init.txt",
        }
    }
}

/// A named set of valid configuration keys corresponding to a historical
/// format of the game's configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// DF 0.31.03 and earlier: a single `init.txt` holding display, gameplay
    /// and color keys. There is no `d_init.txt` and no `colors.txt`.
    Legacy,
    /// DF 0.31.04 and later: `init.txt` plus `d_init.txt`, colors in a
    /// separate `colors.txt`.
    Split,
}

impl SchemaVersion {
    /// The configuration files this version actually has.
    pub fn files(&self) -> &'static [InitFile] {
        match self {
            SchemaVersion::Legacy => &[InitFile::Init],
            SchemaVersion::Split => &[InitFile::Init, InitFile::DInit],
        }
    }

    pub fn has_file(&self, file: InitFile) -> bool {
        self.files().contains(&file)
    }

    /// The declared key set for `file`, or `None` when this version lacks
    /// the file entirely.
    pub fn declared_keys(&self, file: InitFile) -> Option<&'static HashSet<String>> {
        match (self, file) {
            (SchemaVersion::Legacy, InitFile::Init) => Some(&LEGACY_INIT_KEYS),
            (SchemaVersion::Legacy, InitFile::DInit) => None,
            (SchemaVersion::Split, InitFile::Init) => Some(&SPLIT_INIT_KEYS),
            (SchemaVersion::Split, InitFile::DInit) => Some(&SPLIT_D_INIT_KEYS),
        }
    }
}

/// The 16 color names of the game's palette, in palette order.
pub const COLOR_NAMES: [&str; 16] = [
    "BLACK", "BLUE", "GREEN", "CYAN", "RED", "MAGENTA", "BROWN", "LGRAY", "DGRAY", "LBLUE",
    "LGREEN", "LCYAN", "LRED", "LMAGENTA", "YELLOW", "WHITE",
];

/// The 48 color component keys (`<NAME>_R`, `<NAME>_G`, `<NAME>_B`),
/// grouped per color in palette order.
pub fn color_component_keys() -> impl Iterator<Item = String> {
    COLOR_NAMES
        .iter()
        .flat_map(|name| ["R", "G", "B"].map(|c| format!("{name}_{c}")))
}

/// Display and sound keys of `init.txt` (Split schema).
const INIT_KEYS: &[&str] = &[
    "SOUND",
    "VOLUME",
    "INTRO",
    "WINDOWED",
    "WINDOWEDX",
    "WINDOWEDY",
    "RESIZABLE",
    "FONT",
    "FULLSCREENX",
    "FULLSCREENY",
    "FULLFONT",
    "BLACK_SPACE",
    "GRAPHICS",
    "GRAPHICS_FONT",
    "GRAPHICS_FULLFONT",
    "GRAPHICS_WINDOWEDX",
    "GRAPHICS_WINDOWEDY",
    "GRAPHICS_FULLSCREENX",
    "GRAPHICS_FULLSCREENY",
    "GRAPHICS_BLACK_SPACE",
    "PRINT_MODE",
    "SINGLE_BUFFER",
    "ARB_SYNC",
    "VSYNC",
    "TEXTURE_PARAM",
    "TOPMOST",
    "FPS",
    "FPS_CAP",
    "G_FPS_CAP",
    "PRIORITY",
    "ZOOM_SPEED",
    "MOUSE",
    "MOUSE_PICTURE",
    "KEY_HOLD_MS",
    "KEY_REPEAT_MS",
    "KEY_REPEAT_ACCEL_LIMIT",
    "KEY_REPEAT_ACCEL_START",
    "MACRO_MS",
    "RECENTER_INTERFACE_SHUTDOWN_MS",
    "COMPRESSED_SAVES",
    "TRUETYPE",
];

/// Gameplay keys of `d_init.txt` (Split schema).
const D_INIT_KEYS: &[&str] = &[
    "AUTOSAVE",
    "AUTOBACKUP",
    "AUTOSAVE_PAUSE",
    "INITIAL_SAVE",
    "PAUSE_ON_LOAD",
    "EMBARK_WARNING_ALWAYS",
    "EMBARK_RECTANGLE",
    "SHOW_EMBARK_TUNNEL",
    "SHOW_EMBARK_RIVER",
    "SHOW_EMBARK_POOL",
    "SHOW_EMBARK_M_POOL",
    "SHOW_EMBARK_OTHER",
    "SHOW_FLOW_AMOUNTS",
    "SHOW_IMP_QUALITY",
    "SHOW_ALL_HISTORY_IN_DWARF_MODE",
    "TEMPERATURE",
    "WEATHER",
    "ECONOMY",
    "INVADERS",
    "CAVEINS",
    "ARTIFACTS",
    "LOG_MAP_REJECTS",
    "IDLERS",
    "POPULATION_CAP",
    "STRICT_POPULATION_CAP",
    "BABY_CHILD_CAP",
    "VISITOR_CAP",
    "INVASION_SOLDIER_CAP",
    "INVASION_MONSTER_CAP",
    "VARIED_GROUND_TILES",
    "ENGRAVINGS_START_OBSCURED",
    "ADVENTURER_TRAPS",
    "ADVENTURER_ALWAYS_CENTER",
    "NICKNAME_DWARF",
    "NICKNAME_ADVENTURE",
    "NICKNAME_LEGENDS",
    "WALKING_SPREADS_SPATTER_DWF",
    "WALKING_SPREADS_SPATTER_ADV",
    "COFFIN_NO_PETS_DEFAULT",
    "GRAZE_COEFFICIENT",
    "SET_LABOR_LISTS",
    "TESTING_ARENA",
    "POST_PREPARE_EMBARK_CONFIRMATION",
];

static SPLIT_INIT_KEYS: LazyLock<HashSet<String>> =
    LazyLock::new(|| INIT_KEYS.iter().map(|k| k.to_string()).collect());

static SPLIT_D_INIT_KEYS: LazyLock<HashSet<String>> =
    LazyLock::new(|| D_INIT_KEYS.iter().map(|k| k.to_string()).collect());

// Legacy kept everything in one file, colors included.
static LEGACY_INIT_KEYS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    INIT_KEYS
        .iter()
        .chain(D_INIT_KEYS.iter())
        .map(|k| k.to_string())
        .chain(color_component_keys())
        .collect()
});
