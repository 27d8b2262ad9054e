//! Config directory paths.
//!
//!   $XDG_CONFIG_HOME/input-stealer (default ~/.config/input-stealer)

use std::path::PathBuf;

/// Directory holding `config.json`.
pub fn get_config_dir() -> PathBuf {
    get_config_base().join("input-stealer")
}

/// Default location of the config file.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

fn get_config_base() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    })
}
