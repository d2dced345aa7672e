//! Pakt Core Library
//!
//! Provides the domain logic for finding Windows packages in the winget and
//! Chocolatey catalogs, generating their install scripts and rolling them out
//! to managed devices.

pub mod catalog;
pub mod config;
pub mod context;
pub mod credentials;
pub mod deploy;
pub mod error;
pub mod script;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigScope, ConfigStore, DeploySettings, PaktConfig, SearchSettings};
    pub use crate::context::AppContext;

    // Catalogs
    pub use crate::catalog::{CatalogSearch, CommandRunner, ProcessRunner, SearchScope};
    pub use crate::types::{PackageRecord, PackageSource};

    // Scripts
    pub use crate::script::{DirectorySink, SaveOutcome, ScriptSink, suggested_filename, synthesize};

    // Credentials
    pub use crate::credentials::{CredentialGate, Credentials, FileKeystore, Keystore, MemoryKeystore};

    // Deployment
    pub use crate::deploy::{
        DeployOutcome, DeploymentBackend, DeploymentConfig, DeploymentOrchestrator, LogEntry,
        Progress, Session, Severity, SimulatedBackend, Stage, Workflow, WorkflowEvent,
        WorkflowState,
    };

    // Errors
    pub use crate::error::{
        CredentialError, InvocationError, SearchError, StageFailure, ValidationError, WorkflowError,
    };
}
