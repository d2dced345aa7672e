//! Enterprise-access credentials and the gate that guards deployment.
//!
//! The gate holds at most one [`Credentials`] value. It is only replaced by an
//! explicit [`CredentialGate::set`], which validates first and persists through
//! the injected [`Keystore`] before the new value becomes visible. No network
//! check is performed; authenticity is the deployment back end's concern.

pub mod keystore;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, ValidationError};

pub use keystore::{FileKeystore, Keystore, MemoryKeystore};

/// App registration used to reach the device-management tenant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Every field must be non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyCredentialField(field));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Blocks deployment until complete credentials are on file.
pub struct CredentialGate {
    keystore: Box<dyn Keystore>,
    current: Option<Credentials>,
}

impl CredentialGate {
    /// Closed gate; nothing is read from the keystore.
    pub fn new(keystore: Box<dyn Keystore>) -> Self {
        Self {
            keystore,
            current: None,
        }
    }

    /// Gate restored from previously persisted credentials, if any.
    ///
    /// Persisted values that fail validation are ignored and the gate stays
    /// closed.
    pub fn load(keystore: Box<dyn Keystore>) -> anyhow::Result<Self> {
        let current = match keystore.load()? {
            Some(credentials) => match credentials.validate() {
                Ok(()) => Some(credentials),
                Err(error) => {
                    tracing::warn!(error = %error, "Ignoring incomplete stored credentials");
                    None
                }
            },
            None => None,
        };
        Ok(Self { keystore, current })
    }

    pub fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.current.as_ref()
    }

    /// Validate, persist, then open the gate.
    ///
    /// On any error the gate and the keystore keep their previous values.
    pub fn set(&mut self, credentials: Credentials) -> Result<(), CredentialError> {
        credentials.validate()?;
        self.keystore
            .store(&credentials)
            .map_err(CredentialError::Persist)?;
        tracing::info!(tenant_id = %credentials.tenant_id, "Credentials saved");
        self.current = Some(credentials);
        Ok(())
    }
}

impl fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGate")
            .field("ready", &self.is_ready())
            .finish()
    }
}
