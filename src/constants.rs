//! Application-wide constants.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Keychord";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "keychord";

/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "keychord";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "KEYCHORD_CONFIG_DIR";

/// Environment variable holding the tracing filter.
pub const LOG_FILTER_ENV: &str = "KEYCHORD_LOG";
