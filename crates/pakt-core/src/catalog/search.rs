//! Live catalog search through the package-manager executables.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchSettings;
use crate::error::{InvocationError, SearchError, ValidationError};
use crate::types::{PackageRecord, PackageSource};

use super::merge::merge;

/// Which catalogs a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    Both,
    Winget,
    Chocolatey,
}

impl SearchScope {
    pub fn includes(&self, source: PackageSource) -> bool {
        match self {
            SearchScope::Both => true,
            SearchScope::Winget => source == PackageSource::Winget,
            SearchScope::Chocolatey => source == PackageSource::Chocolatey,
        }
    }
}

impl std::str::FromStr for SearchScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" | "all" => Ok(SearchScope::Both),
            other => match other.parse::<PackageSource>() {
                Ok(PackageSource::Winget) => Ok(SearchScope::Winget),
                Ok(PackageSource::Chocolatey) => Ok(SearchScope::Chocolatey),
                Err(_) => anyhow::bail!(
                    "Unknown search scope: '{}'. Use 'both', 'winget' or 'chocolatey'",
                    s
                ),
            },
        }
    }
}

/// `APPINSTALLER_CLI_ERROR_NO_APPLICATIONS_FOUND`: winget's exit code for a
/// search without matches. Treated as an empty result, not a failure.
pub const WINGET_NO_MATCH_EXIT: i32 = 0x8A15_0014_u32 as i32;

/// Runs one package manager's search and returns its raw console output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_search(
        &self,
        source: PackageSource,
        query: &str,
    ) -> Result<String, InvocationError>;
}

/// [`CommandRunner`] that spawns the real executables.
///
/// The query is passed as a single argument, never through a shell.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    winget_program: String,
    choco_program: String,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            winget_program: settings.winget_program.clone(),
            choco_program: settings.choco_program.clone(),
            timeout: settings.timeout(),
        }
    }

    /// Program and arguments used to search `source` for `query`.
    pub fn command_line(&self, source: PackageSource, query: &str) -> (String, Vec<String>) {
        match source {
            PackageSource::Winget => (
                self.winget_program.clone(),
                vec![
                    "search".to_string(),
                    "--name".to_string(),
                    query.to_string(),
                    "--accept-source-agreements".to_string(),
                ],
            ),
            PackageSource::Chocolatey => (
                self.choco_program.clone(),
                vec!["search".to_string(), query.to_string()],
            ),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run_search(
        &self,
        source: PackageSource,
        query: &str,
    ) -> Result<String, InvocationError> {
        let (program, args) = self.command_line(source, query);
        tracing::debug!(%source, program = %program, ?args, "Running catalog search");

        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(InvocationError::Timeout {
                    catalog: source,
                    timeout: self.timeout,
                });
            }
            Ok(Err(error)) => {
                return Err(InvocationError::Spawn {
                    catalog: source,
                    program,
                    error,
                });
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if source == PackageSource::Winget && output.status.code() == Some(WINGET_NO_MATCH_EXIT) {
            return Ok(stdout);
        }
        if !output.status.success() {
            return Err(InvocationError::NonZeroExit {
                catalog: source,
                code: output.status.code(),
                stderr: failure_detail(&output.stderr, &stdout),
            });
        }

        Ok(stdout)
    }
}

/// Last meaningful line of stderr, or of stdout when stderr is empty
/// (winget reports "no package found" on stdout).
fn failure_detail(stderr: &[u8], stdout: &str) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let last_line = |text: &str| {
        text.lines()
            .map(|line| line.rsplit('\r').next().unwrap_or(line).trim())
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
    };
    last_line(&stderr)
        .or_else(|| last_line(stdout))
        .unwrap_or_default()
}

/// Searches both catalogs and merges the results.
#[derive(Debug)]
pub struct CatalogSearch<R> {
    runner: R,
    filter_results: bool,
}

impl<R: CommandRunner> CatalogSearch<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            filter_results: false,
        }
    }

    /// Also drop records whose name and id do not contain the query.
    pub fn with_filter(mut self, filter_results: bool) -> Self {
        self.filter_results = filter_results;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Query every catalog in `scope` concurrently and merge, winget first.
    ///
    /// Fails as a whole when any queried catalog fails: a partial list is
    /// never returned.
    pub async fn search(
        &self,
        query: &str,
        scope: SearchScope,
    ) -> Result<Vec<PackageRecord>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }

        let (primary, secondary) = tokio::join!(
            self.fetch(PackageSource::Winget, query, scope),
            self.fetch(PackageSource::Chocolatey, query, scope),
        );
        let primary = primary?;
        let secondary = secondary?;

        let filter = self.filter_results.then_some(query);
        let results = merge(primary, secondary, filter);
        tracing::info!(query, count = results.len(), "Catalog search finished");
        Ok(results)
    }

    async fn fetch(
        &self,
        source: PackageSource,
        query: &str,
        scope: SearchScope,
    ) -> Result<Vec<PackageRecord>, InvocationError> {
        if !scope.includes(source) {
            return Ok(Vec::new());
        }
        match self.runner.run_search(source, query).await {
            Ok(output) => Ok(super::parse(source, &output)),
            Err(error) => {
                tracing::warn!(%source, error = %error, "Catalog search failed");
                Err(error)
            }
        }
    }
}
