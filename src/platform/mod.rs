// X Eyes platform paths
// Config and data directories, resolved through `dirs` with an
// environment override for each so hosts and tests can relocate them.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "xeyes";

/// Overrides [`get_config_dir`] when set.
pub const CONFIG_DIR_ENV: &str = "XEYES_CONFIG_DIR";
/// Overrides [`get_data_dir`] when set.
pub const DATA_DIR_ENV: &str = "XEYES_DATA_DIR";

fn resolve(override_var: &str, base: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env::var_os(override_var).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    base.unwrap_or_else(env::temp_dir).join(APP_DIR)
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/xeyes` or `~/.config/xeyes`
/// - **macOS**: `~/Library/Application Support/xeyes`
/// - **Windows**: `%APPDATA%\xeyes`
pub fn get_config_dir() -> PathBuf {
    resolve(CONFIG_DIR_ENV, dirs::config_dir())
}

/// Directory holding the SQLite store.
///
/// - **Linux**: `$XDG_DATA_HOME/xeyes` or `~/.local/share/xeyes`
/// - **macOS**: `~/Library/Application Support/xeyes`
/// - **Windows**: `%APPDATA%\xeyes`
pub fn get_data_dir() -> PathBuf {
    resolve(DATA_DIR_ENV, dirs::data_dir())
}
