// SPDX-License-Identifier: MIT

//! XDG-style data/cache directory discovery (spec.md §6's "Persisted
//! state layout" / "Under the user cache dir" roots).

use std::path::PathBuf;

/// `~/.local/share/cirun` (or the platform equivalent via `dirs`).
pub fn data_dir() -> PathBuf {
    std::env::var_os("CIRUN_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join("cirun")))
        .unwrap_or_else(|| PathBuf::from(".cirun/data"))
}

/// `~/.cache/cirun` (or the platform equivalent via `dirs`).
pub fn cache_dir() -> PathBuf {
    std::env::var_os("CIRUN_CACHE_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|d| d.join("cirun")))
        .unwrap_or_else(|| PathBuf::from(".cirun/cache"))
}

/// `~/.config/cirun/config.toml` (or the platform equivalent via `dirs`).
pub fn config_file() -> PathBuf {
    std::env::var_os("CIRUN_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("cirun").join("config.toml")))
        .unwrap_or_else(|| PathBuf::from(".cirun/config.toml"))
}
