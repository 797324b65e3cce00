//! Common constants used throughout the sprout application.

/// Descriptor file names, in order of preference.
/// Only looked up directly under a template directory, never copied to the output.
pub const CONFIG_FILES: [&str; 3] = ["sprout.json", "sprout.yaml", "sprout.yml"];

/// Environment variable designating the template root directory.
pub const TEMPLATES_ENV: &str = "SPROUT_TEMPLATES";

/// Directory name used under the user config dir when the variable is unset.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Application name, used for usage lines and the default template root.
pub const APP_NAME: &str = "sprout";

/// Flag keys owned by the template command itself.
/// Argument specs using one of them are never registered as flags.
pub const RESERVED_FLAGS: [&str; 5] = ["f", "force", "help", "o", "output"];

/// Marker prefix of positional argument keys in descriptors (`"$0"`, `"$1"`, ...).
pub const POSITIONAL_PREFIX: char = '$';
