//! File format tokens, reserved names and config limits
//!
//! Anything written to or read from disk by more than one module is named
//! here so the session, plugin and rule formats cannot drift apart.

/// Context-rule string format
pub mod rules {
    /// Separator between every element of a rule string
    pub const SEP: &str = "%%%%%";

    /// Alternative separator inside a rule value ("a || b")
    pub const OR: &str = "||";

    /// Conjunctive separator inside a rule value ("a && b")
    pub const AND: &str = "&&";
}

/// Session and plugin file format
pub mod file {
    /// Section holding registry records in a session file
    pub const SECTION_RECORDS: &str = "MOD";

    /// Section holding general preferences
    pub const SECTION_GENERAL: &str = "General";

    /// Section holding main window geometry
    pub const SECTION_WINDOW: &str = "Window";

    /// Section holding tab/interface preferences
    pub const SECTION_INTERFACE: &str = "Interface";

    /// Header of a plugin file
    pub const SECTION_PLUGIN: &str = "Plugin";

    /// File name of the plugin description inside a plugin directory
    pub const PLUGIN_FILE: &str = "plugin";

    /// Directory inside a plugin holding per-item script directories
    pub const PLUGIN_FILES_DIR: &str = "files";

    /// Session file name inside the settings directory
    pub const SESSION_FILE: &str = "session";

    /// Suffix of the temporary file used for atomic session writes
    pub const TMP_SUFFIX: &str = ".tmp";
}

/// Record naming and sentinel values
pub mod names {
    /// Prefix of every user-created record name
    pub const CUSTOM_PREFIX: &str = "cstm_";

    /// Number of hex digits following the custom prefix
    pub const CUSTOM_HEX_DIGITS: usize = 8;

    /// Description marking a record as a plugin mirror
    pub const MIRROR_DESC: &str = "@plugin@mirror@";

    /// Label of the placeholder child keeping a submenu non-empty
    pub const PLACEHOLDER_LABEL: &str = "New _Command";

    /// Script file executed for script-kind commands
    pub const SCRIPT_FILE: &str = "exec.sh";
}

/// Runtime configuration locations
pub mod config {
    /// Application directory under the user config dir
    pub const APP_DIR: &str = "xset";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    /// Script directories live here, one per custom record
    pub const SCRIPTS_DIR: &str = "scripts";

    /// Per-record plugin data directories live here
    pub const PLUGIN_DATA_DIR: &str = "plugin-data";

    /// Default user plugin directory under the settings dir
    pub const PLUGINS_DIR: &str = "plugins";

    /// Environment variable overriding the settings directory
    pub const ENV_SETTINGS_DIR: &str = "XSET_SETTINGS_DIR";

    /// Environment variable overriding the autosave delay (milliseconds)
    pub const ENV_AUTOSAVE_MS: &str = "XSET_AUTOSAVE_MS";

    /// Environment variable selecting the log level
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Validation limits for config values
pub mod validation {
    /// Shortest autosave coalescing window (milliseconds)
    pub const MIN_AUTOSAVE_MS: u64 = 100;

    /// Longest autosave coalescing window (milliseconds)
    pub const MAX_AUTOSAVE_MS: u64 = 600_000;

    /// Default autosave coalescing window (milliseconds)
    pub const DEFAULT_AUTOSAVE_MS: u64 = 10_000;
}
