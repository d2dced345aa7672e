//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::catalog::{CatalogSearch, ProcessRunner};
use crate::config::paths::default_global_dir;
use crate::config::{ConfigScope, ConfigStore, PaktConfig, load_effective};
use crate::credentials::{CredentialGate, FileKeystore};
use crate::deploy::{SimulatedBackend, Workflow};
use crate::script::DirectorySink;

/// Unified application context for dependency injection.
///
/// Frontends create this once and build the services they need from it.
#[derive(Debug, Clone)]
pub struct AppContext {
    home_dir: PathBuf,
    project_root: PathBuf,
    global_config_dir: PathBuf,
}

impl AppContext {
    /// Create a new context with explicit paths.
    pub fn new(home_dir: PathBuf, project_root: PathBuf) -> Self {
        let global_config_dir = default_global_dir(&home_dir);
        Self {
            home_dir,
            project_root,
            global_config_dir,
        }
    }

    /// Create context with custom global config directory (for testing).
    pub fn with_global_config_dir(
        home_dir: PathBuf,
        project_root: PathBuf,
        global_config_dir: PathBuf,
    ) -> Self {
        Self {
            home_dir,
            project_root,
            global_config_dir,
        }
    }

    /// Context for the current user and working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let project_root = std::env::current_dir().context("Failed to read current directory")?;
        Ok(Self::new(home_dir, project_root))
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn global_config_dir(&self) -> &Path {
        &self.global_config_dir
    }

    /// Get a ConfigStore for the given scope.
    pub fn config_store(&self, scope: ConfigScope) -> ConfigStore {
        ConfigStore::from_paths(
            scope,
            self.global_config_dir.clone(),
            self.project_root.clone(),
        )
    }

    /// Project config when present, otherwise global, otherwise defaults.
    pub fn load_config(&self) -> anyhow::Result<PaktConfig> {
        load_effective(
            &self.config_store(ConfigScope::Global),
            &self.config_store(ConfigScope::Project),
        )
    }

    pub fn keystore(&self) -> FileKeystore {
        FileKeystore::in_dir(&self.global_config_dir)
    }

    /// Credential gate restored from the user's keystore.
    pub fn credential_gate(&self) -> anyhow::Result<CredentialGate> {
        CredentialGate::load(Box::new(self.keystore()))
    }

    pub fn catalog_search(&self, config: &PaktConfig) -> CatalogSearch<ProcessRunner> {
        CatalogSearch::new(ProcessRunner::new(&config.search)).with_filter(config.search.filter_results)
    }

    /// Configured script directory, relative paths resolved against the
    /// project root. Defaults to the project root itself.
    pub fn script_dir(&self, config: &PaktConfig) -> PathBuf {
        match &config.output.script_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.project_root.join(dir),
            None => self.project_root.clone(),
        }
    }

    pub fn script_sink(&self, config: &PaktConfig) -> DirectorySink {
        DirectorySink::new(self.script_dir(config))
    }

    pub fn workflow(&self, config: &PaktConfig) -> Workflow {
        Workflow::new(config.deploy.clone())
    }

    pub fn simulated_backend(&self, config: &PaktConfig) -> SimulatedBackend {
        SimulatedBackend::new(config.deploy.stage_delay_scale)
    }
}
