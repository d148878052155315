// src/infra/paths.rs — Config file location
//
// LEADLOOP_HOME overrides the config directory for isolation (tests, CI).
// When unset, config lives in ~/.leadloop/.

use directories::BaseDirs;
use std::path::PathBuf;

/// Returns the LEADLOOP_HOME override, if set.
fn leadloop_home() -> Option<PathBuf> {
    std::env::var_os("LEADLOOP_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Home directory, or the working directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $LEADLOOP_HOME/ or ~/.leadloop/
pub fn config_dir() -> PathBuf {
    leadloop_home().unwrap_or_else(|| dirs_home().join(".leadloop"))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
