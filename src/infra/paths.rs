// src/infra/paths.rs — Config and data path management
//
// All paths respect the AGGREGATOR_HOME environment variable for isolation.
// When AGGREGATOR_HOME is set, config and data live under that directory.
// When unset, config uses ~/.aggregator/ and data uses XDG_DATA_HOME/aggregator.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the AGGREGATOR_HOME override, if set.
fn aggregator_home() -> Option<PathBuf> {
    std::env::var_os("AGGREGATOR_HOME").map(PathBuf::from)
}

/// Configuration directory: $AGGREGATOR_HOME/ or ~/.aggregator/
pub fn config_dir() -> PathBuf {
    if let Some(home) = aggregator_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".aggregator"),
        None => PathBuf::from(".aggregator"),
    }
}

/// Data directory: $AGGREGATOR_HOME/data/ or ~/.local/share/aggregator/
pub fn data_dir() -> PathBuf {
    if let Some(home) = aggregator_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "aggregator") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

/// Default history database path
pub fn db_path() -> PathBuf {
    data_dir().join("aggregator.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
