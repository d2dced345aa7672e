//! Shared core types used across the catalog, script and deploy layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Package catalog a record was read from.
///
/// Winget is the primary (higher-trust) source; Chocolatey is the secondary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageSource {
    /// Windows Package Manager (primary).
    Winget,
    /// Chocolatey community repository (secondary).
    Chocolatey,
}

impl PackageSource {
    pub const ALL: [PackageSource; 2] = [PackageSource::Winget, PackageSource::Chocolatey];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageSource::Winget => "winget",
            PackageSource::Chocolatey => "chocolatey",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, PackageSource::Winget)
    }

    /// Ordering rank used when presenting results: primary first.
    pub fn precedence(&self) -> u8 {
        match self {
            PackageSource::Winget => 0,
            PackageSource::Chocolatey => 1,
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PackageSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winget" | "w" => Ok(PackageSource::Winget),
            "chocolatey" | "choco" | "c" => Ok(PackageSource::Chocolatey),
            _ => anyhow::bail!("Unknown package source: '{}'. Use 'winget' or 'chocolatey'", s),
        }
    }
}

/// One normalized catalog entry.
///
/// `id` is only unique within its `source`: the same application may appear
/// once per catalog under different identifiers, and both entries are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub id: String,
    /// Free-form; winget and Chocolatey versions are not semver.
    pub version: String,
    pub source: PackageSource,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl PackageRecord {
    /// Build a record with the synthesized "Package <name>" description.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        version: impl Into<String>,
        source: PackageSource,
        publisher: Option<String>,
    ) -> Self {
        let name = name.into();
        let description = format!("Package {}", name);
        Self {
            name,
            id: id.into(),
            version: version.into(),
            source,
            description,
            publisher,
        }
    }

    /// Key that identifies the record across both catalogs.
    pub fn key(&self) -> (PackageSource, &str) {
        (self.source, self.id.as_str())
    }
}
