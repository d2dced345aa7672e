//! Deployment: operator workflow, stage sequencing and the back-end seam.
//!
//! - [`workflow`] holds the pure session state machine
//! - [`orchestrator`] runs the stages against a [`backend::DeploymentBackend`]
//! - [`log`] is the append-only log both of them write to

pub mod backend;
pub mod config;
pub mod log;
pub mod orchestrator;
pub mod stage;
pub mod workflow;

pub use backend::{DeploymentBackend, DeploymentRequest, SimulatedBackend};
pub use config::DeploymentConfig;
pub use log::{DeploymentLog, LogEntry, Notice, Severity};
pub use orchestrator::{DeployOutcome, DeploymentOrchestrator};
pub use stage::{Progress, STAGES, Stage};
pub use workflow::{Session, Workflow, WorkflowEvent, WorkflowState, transition};
