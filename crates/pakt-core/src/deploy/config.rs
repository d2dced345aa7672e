//! Operator-adjustable rollout parameters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::DeploySettings;
use crate::types::{PackageRecord, PackageSource};

/// Deployment parameters for one selected package.
///
/// Created from the record when it is selected, edited before deployment,
/// then read-only while the orchestrator runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub app_id: String,
    pub display_name: String,
    pub publisher: String,
    pub version: String,
    pub description: String,
    pub install_command: String,
    pub uninstall_command: String,
    pub requirements: String,
    pub target_groups: BTreeSet<String>,
    pub install_as_system: bool,
    pub silent_install: bool,
    pub auto_update: bool,
}

impl DeploymentConfig {
    /// Defaults for `record`, with switches and requirements taken from
    /// `defaults`.
    pub fn from_record(record: &PackageRecord, defaults: &DeploySettings) -> Self {
        Self {
            app_id: record.id.clone(),
            display_name: record.name.clone(),
            publisher: record.publisher.clone().unwrap_or_default(),
            version: record.version.clone(),
            description: record.description.clone(),
            install_command: install_command(record, defaults.silent_install),
            uninstall_command: uninstall_command(record, defaults.silent_install),
            requirements: defaults.requirements.clone(),
            target_groups: defaults
                .target_groups
                .iter()
                .filter_map(|group| normalize_group(group))
                .collect(),
            install_as_system: defaults.install_as_system,
            silent_install: defaults.silent_install,
            auto_update: defaults.auto_update,
        }
    }

    pub fn with_target_group(mut self, group: impl AsRef<str>) -> Self {
        self.add_target_group(group);
        self
    }

    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }

    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Add a group id; blank ids are ignored. Returns whether the set changed.
    pub fn add_target_group(&mut self, group: impl AsRef<str>) -> bool {
        match normalize_group(group.as_ref()) {
            Some(group) => self.target_groups.insert(group),
            None => false,
        }
    }

    pub fn remove_target_group(&mut self, group: &str) -> bool {
        self.target_groups.remove(group.trim())
    }
}

/// Package-manager command that installs `record`.
pub fn install_command(record: &PackageRecord, silent: bool) -> String {
    match record.source {
        PackageSource::Winget => {
            let silent = if silent { " --silent" } else { "" };
            format!(
                "winget install --id {} --exact{} --accept-package-agreements --accept-source-agreements",
                record.id, silent
            )
        }
        PackageSource::Chocolatey => format!("choco install {} -y", record.id),
    }
}

/// Package-manager command that removes `record`.
pub fn uninstall_command(record: &PackageRecord, silent: bool) -> String {
    match record.source {
        PackageSource::Winget => {
            let silent = if silent { " --silent" } else { "" };
            format!("winget uninstall --id {} --exact{}", record.id, silent)
        }
        PackageSource::Chocolatey => format!("choco uninstall {} -y", record.id),
    }
}

fn normalize_group(group: &str) -> Option<String> {
    let group = group.trim();
    (!group.is_empty()).then(|| group.to_string())
}
