//! Operator session state machine.
//!
//! [`transition`] is a pure function from the current [`Session`] and a
//! [`WorkflowEvent`] to the next session plus the log notices the step
//! produced. It never reads the clock or touches I/O; [`Workflow`] wraps it,
//! stamps the notices and keeps the current session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::DeploymentConfig;
use super::log::{DeploymentLog, LogEntry, Notice};
use super::stage::{Progress, STAGES, Stage};
use crate::config::DeploySettings;
use crate::error::{StageFailure, ValidationError, WorkflowError};
use crate::script;
use crate::types::PackageRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    Searching,
    Configuring,
    Deploying,
    Succeeded,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowState::Searching => "searching",
            WorkflowState::Configuring => "configuring",
            WorkflowState::Deploying => "deploying",
            WorkflowState::Succeeded => "succeeded",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    SearchStarted { query: String },
    SearchCompleted { results: Vec<PackageRecord> },
    SearchFailed { reason: String },
    /// Pick a record from the current results by position.
    PackageSelected { index: usize },
    ConfigUpdated(DeploymentConfig),
    DeployRequested { gate_ready: bool },
    StageCompleted { stage: Stage },
    StageFailed(StageFailure),
    Reset,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::SearchStarted { .. } => "search-started",
            WorkflowEvent::SearchCompleted { .. } => "search-completed",
            WorkflowEvent::SearchFailed { .. } => "search-failed",
            WorkflowEvent::PackageSelected { .. } => "package-selected",
            WorkflowEvent::ConfigUpdated(_) => "config-updated",
            WorkflowEvent::DeployRequested { .. } => "deploy-requested",
            WorkflowEvent::StageCompleted { .. } => "stage-completed",
            WorkflowEvent::StageFailed(_) => "stage-failed",
            WorkflowEvent::Reset => "reset",
        }
    }
}

/// Everything the operator has done since the last reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    state: WorkflowState,
    defaults: DeploySettings,
    stages: Vec<Stage>,
    query: Option<String>,
    results: Vec<PackageRecord>,
    selection: Option<PackageRecord>,
    config: Option<DeploymentConfig>,
    script: Option<String>,
    progress: Progress,
    last_failure: Option<StageFailure>,
    log: DeploymentLog,
}

impl Session {
    /// Fresh session in `Searching`, running the full stage list.
    pub fn new(defaults: DeploySettings) -> Self {
        Self::with_stages(defaults, STAGES.to_vec())
    }

    pub fn with_stages(defaults: DeploySettings, stages: Vec<Stage>) -> Self {
        let total = stages.len();
        Self {
            state: WorkflowState::Searching,
            defaults,
            stages,
            query: None,
            results: Vec::new(),
            selection: None,
            config: None,
            script: None,
            progress: Progress::starting(total),
            last_failure: None,
            log: DeploymentLog::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn defaults(&self) -> &DeploySettings {
        &self.defaults
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn results(&self) -> &[PackageRecord] {
        &self.results
    }

    pub fn selection(&self) -> Option<&PackageRecord> {
        self.selection.as_ref()
    }

    pub fn config(&self) -> Option<&DeploymentConfig> {
        self.config.as_ref()
    }

    /// Install script generated for the current selection.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Failure of the most recent deployment attempt, if it failed. Cleared
    /// when the next attempt starts.
    pub fn last_failure(&self) -> Option<&StageFailure> {
        self.last_failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.last_failure.is_some()
    }

    pub fn log(&self) -> &DeploymentLog {
        &self.log
    }

    /// Stage the orchestrator should run next while deploying.
    pub fn next_stage(&self) -> Option<Stage> {
        match self.state {
            WorkflowState::Deploying => self.stages.get(self.progress.completed).copied(),
            _ => None,
        }
    }

    fn reset(&self) -> Self {
        Self::with_stages(self.defaults.clone(), self.stages.clone())
    }
}

/// Compute the session that follows `event`.
///
/// Events that do not apply in the current state return
/// [`WorkflowError::InvalidTransition`]; rejected input returns
/// [`WorkflowError::Validation`]. In both cases `session` is left as it was.
pub fn transition(
    session: &Session,
    event: WorkflowEvent,
) -> Result<(Session, Vec<Notice>), WorkflowError> {
    use WorkflowEvent as E;
    use WorkflowState as S;

    let mut next = session.clone();
    let mut notices = Vec::new();

    match (session.state, event) {
        (S::Searching, E::SearchStarted { query }) => {
            let query = query.trim();
            if query.is_empty() {
                return Err(ValidationError::EmptyQuery.into());
            }
            notices.push(Notice::info(format!("Searching for \"{}\"", query)));
            next.query = Some(query.to_string());
            next.results.clear();
        }

        (S::Searching, E::SearchCompleted { results }) if session.query.is_some() => {
            notices.push(Notice::info(format!("Found {} package(s)", results.len())));
            next.results = results;
        }

        (S::Searching, E::SearchFailed { reason }) if session.query.is_some() => {
            notices.push(Notice::error(format!("Search failed: {}", reason)));
            next.results.clear();
        }

        (S::Searching, E::PackageSelected { index }) => {
            let record = match session.results.get(index) {
                Some(record) => record.clone(),
                None if session.results.is_empty() => {
                    return Err(ValidationError::NoSelection.into());
                }
                None => {
                    return Err(ValidationError::SelectionOutOfRange {
                        index,
                        available: session.results.len(),
                    }
                    .into());
                }
            };
            notices.push(Notice::info(format!(
                "Selected {} ({})",
                record.name, record.source
            )));
            next.config = Some(DeploymentConfig::from_record(&record, &session.defaults));
            next.script = Some(script::synthesize(&record));
            next.selection = Some(record);
            next.state = S::Configuring;
        }

        (S::Configuring, E::ConfigUpdated(config)) => {
            next.config = Some(config);
        }

        (S::Configuring, E::DeployRequested { gate_ready: false }) => {
            notices.push(Notice::error(
                "Enterprise credentials are required before deploying",
            ));
        }

        (S::Configuring, E::DeployRequested { gate_ready: true }) => {
            next.progress = Progress::starting(session.stages.len());
            next.last_failure = None;
            // An empty plan has nothing to wait for.
            next.state = if session.stages.is_empty() {
                S::Succeeded
            } else {
                S::Deploying
            };
        }

        (S::Deploying, E::StageCompleted { stage }) if session.next_stage() == Some(stage) => {
            notices.push(Notice {
                severity: stage.completion_severity(),
                message: stage.completion_message().to_string(),
            });
            next.progress.completed += 1;
            if next.progress.completed == next.progress.total {
                next.state = S::Succeeded;
            }
        }

        (S::Deploying, E::StageFailed(failure)) if session.next_stage() == Some(failure.stage) => {
            notices.push(Notice::error(failure.to_string()));
            next.last_failure = Some(failure);
            next.state = S::Configuring;
        }

        (S::Searching | S::Configuring | S::Succeeded, E::Reset) => {
            next = session.reset();
        }

        (state, event) => {
            return Err(WorkflowError::InvalidTransition {
                state: state.to_string(),
                event: event.name().to_string(),
            });
        }
    }

    Ok((next, notices))
}

/// Current session plus the clock that stamps its log.
#[derive(Debug, Clone)]
pub struct Workflow {
    session: Session,
}

impl Workflow {
    pub fn new(defaults: DeploySettings) -> Self {
        Self {
            session: Session::new(defaults),
        }
    }

    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> WorkflowState {
        self.session.state
    }

    pub fn log(&self) -> &DeploymentLog {
        &self.session.log
    }

    /// Apply `event`, stamping its notices with the current time. Returns the
    /// entries appended by this step.
    pub fn apply(&mut self, event: WorkflowEvent) -> Result<Vec<LogEntry>, WorkflowError> {
        self.apply_at(event, Utc::now())
    }

    pub fn apply_at(
        &mut self,
        event: WorkflowEvent,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, WorkflowError> {
        let event_name = event.name();
        let from = self.session.state;
        let (mut next, notices) = match transition(&self.session, event) {
            Ok(step) => step,
            Err(error) => {
                tracing::warn!(event = event_name, state = %from, error = %error, "Workflow event rejected");
                return Err(error);
            }
        };

        let appended = notices
            .into_iter()
            .map(|notice| next.log.append(notice, timestamp).clone())
            .collect();

        if next.state != from {
            tracing::info!(event = event_name, from = %from, to = %next.state, "Workflow transition");
        }
        self.session = next;
        Ok(appended)
    }
}
