//! Configuration management for pakt.toml
//!
//! Two scopes are supported:
//! - Global: `<config_dir>/pakt/pakt.toml`
//! - Project: `./pakt.toml`, which replaces the global file when present

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};

pub use parser::{parse_pakt_toml, parse_pakt_toml_str, to_toml};
pub use paths::config_path_for_scope;
pub use schema::{DeploySettings, OutputSettings, PaktConfig, SearchSettings};
pub use store::{ConfigStore, load_effective};

/// Configuration scope levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigScope {
    /// User-wide configuration
    Global,
    /// Per-project configuration (e.g., checked into version control)
    Project,
}
