//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use super::ConfigScope;

pub const CONFIG_FILE_NAME: &str = "pakt.toml";

pub fn config_path_for_scope(scope: ConfigScope, global_dir: &Path, project_root: &Path) -> PathBuf {
    match scope {
        ConfigScope::Global => global_dir.join(CONFIG_FILE_NAME),
        ConfigScope::Project => project_root.join(CONFIG_FILE_NAME),
    }
}

/// Default global config directory (`<config_dir>/pakt`), falling back to
/// `~/.config/pakt` when the platform has no config directory.
pub fn default_global_dir(home_dir: &Path) -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("pakt"))
        .unwrap_or_else(|| home_dir.join(".config").join("pakt"))
}
