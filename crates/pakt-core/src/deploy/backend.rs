//! Device-management back end seam.

use std::time::Duration;

use async_trait::async_trait;

use super::config::DeploymentConfig;
use super::stage::Stage;
use crate::credentials::Credentials;
use crate::types::PackageRecord;

/// Inputs available to a remote stage.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentRequest<'a> {
    pub record: &'a PackageRecord,
    pub config: &'a DeploymentConfig,
    pub credentials: &'a Credentials,
    /// Present once the script-generation stage has run.
    pub script: Option<&'a str>,
}

/// Performs the remote part of each deployment stage.
///
/// Only stages where [`Stage::is_remote`] holds are sent here. On failure the
/// returned reason is shown to the operator unchanged.
#[async_trait]
pub trait DeploymentBackend: Send + Sync {
    async fn execute(&self, stage: Stage, request: &DeploymentRequest<'_>) -> Result<(), String>;
}

/// Stand-in back end that sleeps for each stage's nominal duration and
/// optionally fails at one stage.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay_scale: f64,
    failure: Option<(Stage, String)>,
}

impl SimulatedBackend {
    /// `delay_scale` multiplies every stage's nominal duration; `0.0` runs
    /// without pausing.
    pub fn new(delay_scale: f64) -> Self {
        Self {
            delay_scale: if delay_scale.is_finite() && delay_scale > 0.0 {
                delay_scale
            } else {
                0.0
            },
            failure: None,
        }
    }

    pub fn instant() -> Self {
        Self::new(0.0)
    }

    pub fn failing_at(mut self, stage: Stage, reason: impl Into<String>) -> Self {
        self.failure = Some((stage, reason.into()));
        self
    }

    pub fn delay_for(&self, stage: Stage) -> Duration {
        stage.simulated_delay().mul_f64(self.delay_scale)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[async_trait]
impl DeploymentBackend for SimulatedBackend {
    async fn execute(&self, stage: Stage, request: &DeploymentRequest<'_>) -> Result<(), String> {
        let delay = self.delay_for(stage);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some((_, reason)) = self.failure.as_ref().filter(|(failing, _)| *failing == stage) {
            tracing::debug!(stage = %stage, app_id = %request.config.app_id, "Simulated stage failure");
            return Err(reason.clone());
        }

        tracing::debug!(stage = %stage, app_id = %request.config.app_id, "Simulated stage complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_scales_with_factor() {
        let backend = SimulatedBackend::new(0.5);
        assert_eq!(backend.delay_for(Stage::Upload), Duration::from_millis(1250));
        assert!(SimulatedBackend::instant().delay_for(Stage::Upload).is_zero());
    }

    #[test]
    fn invalid_scale_disables_delay() {
        assert!(SimulatedBackend::new(f64::NAN).delay_for(Stage::Package).is_zero());
        assert!(SimulatedBackend::new(-2.0).delay_for(Stage::Package).is_zero());
    }
}
