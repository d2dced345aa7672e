//! Configuration schema for pakt.toml
//!
//! ```toml
//! [search]
//! timeout_secs = 30
//! winget_program = "winget"
//! choco_program = 'C:\ProgramData\chocolatey\choco.exe'
//! default_scope = "both"
//!
//! [deploy]
//! silent_install = true
//! requirements = "Windows 10 1809+"
//! target_groups = ["All Devices"]
//! stage_delay_scale = 1.0
//!
//! [output]
//! script_dir = "C:/Scripts"
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::catalog::SearchScope;

/// Root configuration structure for pakt.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaktConfig {
    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub deploy: DeploySettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl PaktConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate values serde cannot check on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.search.timeout_secs == 0 {
            anyhow::bail!("search.timeout_secs must be greater than zero");
        }
        if self.search.winget_program.trim().is_empty() {
            anyhow::bail!("search.winget_program must not be empty");
        }
        if self.search.choco_program.trim().is_empty() {
            anyhow::bail!("search.choco_program must not be empty");
        }
        if !self.deploy.stage_delay_scale.is_finite() || self.deploy.stage_delay_scale < 0.0 {
            anyhow::bail!(
                "deploy.stage_delay_scale must be a non-negative number, got {}",
                self.deploy.stage_delay_scale
            );
        }
        Ok(())
    }
}

/// Package-manager invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Upper bound for one package-manager call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_winget_program")]
    pub winget_program: String,

    #[serde(default = "default_choco_program")]
    pub choco_program: String,

    /// Which catalogs to query when the caller does not say
    #[serde(default)]
    pub default_scope: SearchScope,

    /// Drop results whose name and id do not contain the query.
    ///
    /// Off by default: both package managers also match on tags and monikers.
    #[serde(default)]
    pub filter_results: bool,
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            winget_program: default_winget_program(),
            choco_program: default_choco_program(),
            default_scope: SearchScope::default(),
            filter_results: false,
        }
    }
}

/// Defaults copied into a new deployment configuration, plus simulation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploySettings {
    #[serde(default = "default_true")]
    pub silent_install: bool,

    #[serde(default)]
    pub auto_update: bool,

    #[serde(default = "default_true")]
    pub install_as_system: bool,

    #[serde(default = "default_requirements")]
    pub requirements: String,

    #[serde(default)]
    pub target_groups: BTreeSet<String>,

    /// Multiplier for the simulated back end's stage delays (0 disables them)
    #[serde(default = "default_delay_scale")]
    pub stage_delay_scale: f64,

    /// Management portal shown after a successful deployment
    #[serde(default = "default_portal_url")]
    pub portal_url: Url,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            silent_install: true,
            auto_update: false,
            install_as_system: true,
            requirements: default_requirements(),
            target_groups: BTreeSet::new(),
            stage_delay_scale: default_delay_scale(),
            portal_url: default_portal_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    /// Directory offered when saving generated scripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_winget_program() -> String {
    "winget".to_string()
}

fn default_choco_program() -> String {
    r"C:\ProgramData\chocolatey\choco.exe".to_string()
}

fn default_requirements() -> String {
    "Windows 10 1809+".to_string()
}

fn default_delay_scale() -> f64 {
    1.0
}

fn default_portal_url() -> Url {
    Url::parse("https://endpoint.microsoft.com").expect("default portal url is valid")
}

fn default_true() -> bool {
    true
}
