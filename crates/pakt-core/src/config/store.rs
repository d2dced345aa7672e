//! Config store for loading and saving pakt.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{ConfigScope, PaktConfig, parser, paths::config_path_for_scope};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    scope: ConfigScope,
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(scope: ConfigScope, global_dir: PathBuf, project_root: PathBuf) -> Self {
        let config_path = config_path_for_scope(scope, &global_dir, &project_root);
        Self { scope, config_path }
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn load(&self) -> anyhow::Result<PaktConfig> {
        if !self.config_path.exists() {
            return Ok(PaktConfig::new());
        }
        parser::parse_pakt_toml(&self.config_path)
    }

    pub fn save(&self, config: &PaktConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

/// Load the effective configuration: the project file when present,
/// otherwise the global file, otherwise defaults.
pub fn load_effective(global: &ConfigStore, project: &ConfigStore) -> anyhow::Result<PaktConfig> {
    if project.exists() {
        tracing::debug!(path = %project.config_path().display(), "Using project config");
        return project.load();
    }
    global.load()
}
