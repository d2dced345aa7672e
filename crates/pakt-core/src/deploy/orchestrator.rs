//! Drives a deployment through its stages.

use super::backend::{DeploymentBackend, DeploymentRequest};
use super::log::LogEntry;
use super::stage::Stage;
use super::workflow::{Session, Workflow, WorkflowEvent, WorkflowState};
use crate::credentials::CredentialGate;
use crate::error::{StageFailure, ValidationError, WorkflowError};
use crate::script;

/// How a deployment attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Succeeded,
    /// The credential gate was closed; nothing ran.
    Rejected,
    Failed(StageFailure),
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Succeeded)
    }
}

/// Runs the stage sequence for the workflow's current selection.
///
/// Stages run strictly one at a time and in order; the first failure stops
/// the run and returns the workflow to `Configuring` with progress frozen.
pub struct DeploymentOrchestrator<B> {
    backend: B,
}

impl<B: DeploymentBackend> DeploymentOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Request a deployment and, if the gate admits it, run every stage.
    ///
    /// `observer` is called after each workflow step with the updated session
    /// and the log entries that step appended.
    pub async fn run<F>(
        &self,
        workflow: &mut Workflow,
        gate: &CredentialGate,
        mut observer: F,
    ) -> Result<DeployOutcome, WorkflowError>
    where
        F: FnMut(&Session, &[LogEntry]),
    {
        let appended = workflow.apply(WorkflowEvent::DeployRequested {
            gate_ready: gate.is_ready(),
        })?;
        observer(workflow.session(), &appended);

        if workflow.state() == WorkflowState::Succeeded {
            tracing::info!("Deployment plan has no stages");
            return Ok(DeployOutcome::Succeeded);
        }

        let credentials = match gate.credentials() {
            Some(credentials) if workflow.state() == WorkflowState::Deploying => credentials,
            _ => {
                tracing::warn!("Deployment rejected: credentials missing");
                return Ok(DeployOutcome::Rejected);
            }
        };

        let session = workflow.session();
        let record = session
            .selection()
            .cloned()
            .ok_or(ValidationError::NoSelection)?;
        let config = session
            .config()
            .cloned()
            .ok_or(ValidationError::NoSelection)?;
        let stages = session.stages().to_vec();

        tracing::info!(app_id = %config.app_id, source = %record.source, "Starting deployment");

        let mut generated: Option<String> = None;
        for stage in stages {
            let result = match stage {
                Stage::GenerateScript => {
                    generated = Some(script::synthesize(&record));
                    Ok(())
                }
                Stage::Finish => Ok(()),
                remote => {
                    let request = DeploymentRequest {
                        record: &record,
                        config: &config,
                        credentials,
                        script: generated.as_deref(),
                    };
                    self.backend.execute(remote, &request).await
                }
            };

            let event = match result {
                Ok(()) => WorkflowEvent::StageCompleted { stage },
                Err(reason) => WorkflowEvent::StageFailed(StageFailure::new(stage, reason)),
            };
            let failure = match &event {
                WorkflowEvent::StageFailed(failure) => Some(failure.clone()),
                _ => None,
            };

            let appended = workflow.apply(event)?;
            observer(workflow.session(), &appended);

            if let Some(failure) = failure {
                tracing::warn!(stage = %failure.stage, reason = %failure.reason, "Deployment failed");
                return Ok(DeployOutcome::Failed(failure));
            }
        }

        tracing::info!(app_id = %config.app_id, "Deployment succeeded");
        Ok(DeployOutcome::Succeeded)
    }
}
