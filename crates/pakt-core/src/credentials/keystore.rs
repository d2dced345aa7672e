//! Credential persistence backends.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use super::Credentials;

pub const CREDENTIALS_FILE_NAME: &str = "credentials.toml";

/// Persists and retrieves the single credentials record for the current user.
pub trait Keystore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Credentials>>;

    fn store(&self, credentials: &Credentials) -> anyhow::Result<()>;
}

/// TOML file in the user's config directory, readable only by its owner on
/// Unix.
#[derive(Debug, Clone)]
pub struct FileKeystore {
    path: PathBuf,
}

impl FileKeystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Keystore at `<dir>/credentials.toml`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIALS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Keystore for FileKeystore {
    fn load(&self) -> anyhow::Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read credentials file: {}", self.path.display())
        })?;
        let credentials: Credentials = toml::from_str(&content).with_context(|| {
            format!("Failed to parse credentials file: {}", self.path.display())
        })?;
        Ok(Some(credentials))
    }

    fn store(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(credentials).context("Failed to serialize credentials")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create credentials directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content).with_context(|| {
            format!("Failed to write credentials file: {}", self.path.display())
        })?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

/// In-process keystore. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeystore {
    slot: Arc<Mutex<Option<Credentials>>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credentials))),
        }
    }
}

impl Keystore for MemoryKeystore {
    fn load(&self) -> anyhow::Result<Option<Credentials>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential slot lock poisoned"))?;
        Ok(slot.clone())
    }

    fn store(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential slot lock poisoned"))?;
        *slot = Some(credentials.clone());
        Ok(())
    }
}
