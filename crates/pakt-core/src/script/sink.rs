//! Script persistence.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Result of handing a script to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The operator dismissed the file selection.
    Cancelled,
}

/// Writes a generated script to a location the sink chooses.
///
/// Frontends implement this around their own file-selection affordance; the
/// synthesizer itself never touches the filesystem.
pub trait ScriptSink {
    fn save(&self, script: &str, suggested_name: &str) -> anyhow::Result<SaveOutcome>;
}

/// Saves scripts under a fixed directory using the suggested name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScriptSink for DirectorySink {
    fn save(&self, script: &str, suggested_name: &str) -> anyhow::Result<SaveOutcome> {
        let file_name = Path::new(suggested_name)
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid script file name: '{}'", suggested_name))?;

        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create script directory: {}", self.dir.display())
        })?;

        let path = self.dir.join(file_name);
        std::fs::write(&path, script)
            .with_context(|| format!("Failed to write script: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Saved deployment script");
        Ok(SaveOutcome::Saved(path))
    }
}
