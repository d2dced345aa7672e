//! Operator-facing deployment log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        })
    }
}

/// Unstamped message emitted by a workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Append-only, ordered sequence of log entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentLog {
    entries: Vec<LogEntry>,
}

impl DeploymentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, notice: Notice, timestamp: DateTime<Utc>) -> &LogEntry {
        self.entries.push(LogEntry {
            timestamp,
            severity: notice.severity,
            message: notice.message,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}
