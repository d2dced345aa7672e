use tempfile::TempDir;

use pakt_core::credentials::{CredentialGate, Credentials, FileKeystore, Keystore, MemoryKeystore};
use pakt_core::error::{CredentialError, ValidationError};

/// Keystore whose writes always fail.
struct BrokenKeystore;

impl Keystore for BrokenKeystore {
    fn load(&self) -> anyhow::Result<Option<Credentials>> {
        Ok(None)
    }

    fn store(&self, _credentials: &Credentials) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[test]
fn new_gate_is_closed() {
    let gate = CredentialGate::new(Box::new(MemoryKeystore::new()));
    assert!(!gate.is_ready());
    assert!(gate.credentials().is_none());
}

#[test]
fn set_opens_gate_and_persists() {
    let keystore = MemoryKeystore::new();
    let mut gate = CredentialGate::new(Box::new(keystore.clone()));

    gate.set(Credentials::new("tenant", "client", "secret")).unwrap();

    assert!(gate.is_ready());
    assert_eq!(gate.credentials().unwrap().client_id, "client");
    assert_eq!(
        keystore.load().unwrap(),
        Some(Credentials::new("tenant", "client", "secret"))
    );
}

#[test]
fn empty_field_is_rejected_and_nothing_changes() {
    let keystore = MemoryKeystore::with_credentials(Credentials::new("old", "old", "old"));
    let mut gate = CredentialGate::load(Box::new(keystore.clone())).unwrap();

    let error = gate
        .set(Credentials::new("tenant", "client", "   "))
        .unwrap_err();

    assert!(matches!(
        error,
        CredentialError::Validation(ValidationError::EmptyCredentialField("client_secret"))
    ));
    assert_eq!(gate.credentials().unwrap().tenant_id, "old");
    assert_eq!(keystore.load().unwrap().unwrap().tenant_id, "old");
}

#[test]
fn persistence_failure_keeps_gate_closed() {
    let mut gate = CredentialGate::new(Box::new(BrokenKeystore));

    let error = gate
        .set(Credentials::new("tenant", "client", "secret"))
        .unwrap_err();

    assert!(matches!(error, CredentialError::Persist(_)));
    assert!(error.to_string().contains("disk full"));
    assert!(!gate.is_ready());
}

#[test]
fn load_restores_previous_credentials() {
    let keystore = MemoryKeystore::with_credentials(Credentials::new("t", "c", "s"));
    let gate = CredentialGate::load(Box::new(keystore)).unwrap();
    assert!(gate.is_ready());
}

#[test]
fn load_ignores_incomplete_stored_credentials() {
    let keystore = MemoryKeystore::with_credentials(Credentials::new("t", "", "s"));
    let gate = CredentialGate::load(Box::new(keystore)).unwrap();
    assert!(!gate.is_ready());
}

#[test]
fn file_keystore_round_trips_through_disk() {
    let temp = TempDir::new().unwrap();
    let keystore = FileKeystore::in_dir(&temp.path().join("pakt"));

    assert_eq!(keystore.load().unwrap(), None);

    let mut gate = CredentialGate::new(Box::new(keystore.clone()));
    gate.set(Credentials::new("tenant", "client", "secret")).unwrap();

    assert!(keystore.path().exists());
    let reopened = CredentialGate::load(Box::new(keystore)).unwrap();
    assert_eq!(reopened.credentials().unwrap().client_secret, "secret");
}

#[cfg(unix)]
#[test]
fn file_keystore_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let keystore = FileKeystore::in_dir(temp.path());
    keystore
        .store(&Credentials::new("tenant", "client", "secret"))
        .unwrap();

    let mode = std::fs::metadata(keystore.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn corrupt_keystore_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let keystore = FileKeystore::in_dir(temp.path());
    std::fs::write(keystore.path(), "tenant_id = [").unwrap();

    assert!(CredentialGate::load(Box::new(keystore)).is_err());
}
