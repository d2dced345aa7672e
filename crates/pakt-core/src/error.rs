//! Typed errors for the seams where callers branch on the failure kind.
//!
//! I/O-bound glue (config store, keystore, script sink) keeps using
//! `anyhow::Result` with context; these types cover validation, command
//! invocation and workflow misuse.

use std::time::Duration;

use thiserror::Error;

use crate::deploy::Stage;
use crate::types::PackageSource;

/// Rejected operator input. Never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("No package selected: index {index} is out of range ({available} result(s))")]
    SelectionOutOfRange { index: usize, available: usize },

    #[error("No package selected")]
    NoSelection,

    #[error("Credential field '{0}' must not be empty")]
    EmptyCredentialField(&'static str),
}

/// Failure of the external package-manager call.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Failed to launch {catalog} search ({program}): {error}")]
    Spawn {
        catalog: PackageSource,
        program: String,
        #[source]
        error: std::io::Error,
    },

    #[error("{catalog} search timed out after {}s", .timeout.as_secs())]
    Timeout {
        catalog: PackageSource,
        timeout: Duration,
    },

    #[error("{catalog} search exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        catalog: PackageSource,
        code: Option<i32>,
        stderr: String,
    },
}

impl InvocationError {
    pub fn catalog(&self) -> PackageSource {
        match self {
            InvocationError::Spawn { catalog, .. }
            | InvocationError::Timeout { catalog, .. }
            | InvocationError::NonZeroExit { catalog, .. } => *catalog,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Error returned by the workflow transition function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid transition: {event} while {state}")]
    InvalidTransition { state: String, event: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A deployment stage that did not complete. `reason` is reported verbatim
/// from whatever ran the stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} failed: {reason}", .stage.label())]
pub struct StageFailure {
    pub stage: Stage,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Error returned when replacing credentials.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to persist credentials: {0:#}")]
    Persist(anyhow::Error),
}

/// Error returned by a catalog search.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}
