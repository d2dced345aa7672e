//! Deployment stages and progress.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::log::Severity;

/// One step of a rollout, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Authenticate,
    Package,
    GenerateScript,
    Upload,
    ConfigureDetection,
    ConfigureTargeting,
    Assign,
    Finish,
}

/// Every stage, in the order the orchestrator runs them.
pub const STAGES: [Stage; 8] = [
    Stage::Authenticate,
    Stage::Package,
    Stage::GenerateScript,
    Stage::Upload,
    Stage::ConfigureDetection,
    Stage::ConfigureTargeting,
    Stage::Assign,
    Stage::Finish,
];

impl Stage {
    /// Stable kebab-case name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Authenticate => "authenticate",
            Stage::Package => "package",
            Stage::GenerateScript => "generate-script",
            Stage::Upload => "upload",
            Stage::ConfigureDetection => "configure-detection",
            Stage::ConfigureTargeting => "configure-targeting",
            Stage::Assign => "assign",
            Stage::Finish => "finish",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Authenticate => "Authentication",
            Stage::Package => "Packaging",
            Stage::GenerateScript => "Script generation",
            Stage::Upload => "Upload",
            Stage::ConfigureDetection => "Detection rules",
            Stage::ConfigureTargeting => "Targeting",
            Stage::Assign => "Assignment",
            Stage::Finish => "Finalization",
        }
    }

    /// Log line recorded when the stage completes.
    pub fn completion_message(&self) -> &'static str {
        match self {
            Stage::Authenticate => "Authenticated with the device-management tenant",
            Stage::Package => "Created the Win32 application package",
            Stage::GenerateScript => "Generated the PowerShell install script",
            Stage::Upload => "Uploaded the package",
            Stage::ConfigureDetection => "Configured detection rules",
            Stage::ConfigureTargeting => "Configured target groups",
            Stage::Assign => "Assigned the application",
            Stage::Finish => "Deployment completed successfully",
        }
    }

    pub fn completion_severity(&self) -> Severity {
        match self {
            Stage::Finish => Severity::Success,
            _ => Severity::Info,
        }
    }

    /// Whether the stage needs the deployment back end. Script generation and
    /// finalization run locally.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Stage::GenerateScript | Stage::Finish)
    }

    /// Unscaled pause used by the simulated back end.
    pub fn simulated_delay(&self) -> Duration {
        let millis = match self {
            Stage::Authenticate => 1500,
            Stage::Package => 2000,
            Stage::GenerateScript => 1000,
            Stage::Upload => 2500,
            Stage::ConfigureDetection => 1500,
            Stage::ConfigureTargeting => 1500,
            Stage::Assign => 2000,
            Stage::Finish => 1000,
        };
        Duration::from_millis(millis)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        STAGES
            .into_iter()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = STAGES.iter().map(|stage| stage.name()).collect();
                anyhow::anyhow!("Unknown stage: '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

/// Completed stages out of the planned total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn starting(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.completed, self.total, self.percent())
    }
}
