use error_stack::{Report, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

use crate::types::form::auth::AccountSummary;
use crate::util::Sensitive;

#[derive(Debug, Error)]
#[error("Failed to access the session store")]
pub struct StoreError;

/// Everything the client keeps between invocations: the bearer token
/// and the reduced user record that came with it. Always persisted
/// and cleared as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token: Sensitive<String>,
  pub user: AccountSummary,
}

/// Injected persistence seam for [`Session`]s, so client logic can be
/// exercised against an in-memory store and the binary can use a
/// file, without either knowing about the other.
pub trait SessionStore: std::fmt::Debug {
  fn load(&self) -> Result<Option<Session>, StoreError>;
  fn save(&self, session: &Session) -> Result<(), StoreError>;
  fn clear(&self) -> Result<(), StoreError>;
}

/// Test-friendly store; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  slot: Mutex<Option<Session>>,
}

impl MemoryStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }
}

impl SessionStore for MemoryStore {
  fn load(&self) -> Result<Option<Session>, StoreError> {
    match self.slot.lock() {
      Ok(slot) => Ok(slot.clone()),
      Err(..) => Err(Report::new(StoreError).attach_printable("session mutex poisoned")),
    }
  }

  fn save(&self, session: &Session) -> Result<(), StoreError> {
    match self.slot.lock() {
      Ok(mut slot) => {
        *slot = Some(session.clone());
        Ok(())
      }
      Err(..) => Err(Report::new(StoreError).attach_printable("session mutex poisoned")),
    }
  }

  fn clear(&self) -> Result<(), StoreError> {
    match self.slot.lock() {
      Ok(mut slot) => {
        *slot = None;
        Ok(())
      }
      Err(..) => Err(Report::new(StoreError).attach_printable("session mutex poisoned")),
    }
  }
}

/// The real store: one JSON file, created on sign-in and deleted on
/// sign-out (or forced logout).
#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  #[must_use]
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl SessionStore for FileStore {
  fn load(&self) -> Result<Option<Session>, StoreError> {
    let raw = match std::fs::read(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(Report::new(e).change_context(StoreError)),
    };

    serde_json::from_slice(&raw)
      .map(Some)
      .change_context(StoreError)
      .attach_printable("session file holds invalid JSON")
  }

  fn save(&self, session: &Session) -> Result<(), StoreError> {
    let raw = serde_json::to_vec_pretty(session).change_context(StoreError)?;
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).change_context(StoreError)?;
      }
    }
    std::fs::write(&self.path, raw).change_context(StoreError)
  }

  fn clear(&self) -> Result<(), StoreError> {
    match std::fs::remove_file(&self.path) {
      Ok(..) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Report::new(e).change_context(StoreError)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::user::Role;
  use crate::types::id::Id;

  fn session() -> Session {
    Session {
      token: "signed.jwt.token".to_string().into(),
      user: AccountSummary {
        id: Id::new(7),
        username: "salmon-ella".to_string(),
        points: 120,
        level: 2,
        role: Role::Member,
      },
    }
  }

  #[test]
  fn memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert_eq!(store.load().expect("load"), None);

    store.save(&session()).expect("save");
    assert_eq!(store.load().expect("load"), Some(session()));

    store.clear().expect("clear");
    assert_eq!(store.load().expect("load"), None);
  }

  #[test]
  fn file_store_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("session.json"));

    assert_eq!(store.load().expect("load"), None);

    store.save(&session()).expect("save");
    assert_eq!(store.load().expect("load"), Some(session()));

    store.clear().expect("clear");
    assert_eq!(store.load().expect("load"), None);
    // A second clear stays quiet.
    store.clear().expect("clear");
  }

  #[test]
  fn file_store_refuses_corrupt_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"definitely not json").expect("write");

    let store = FileStore::new(path);
    assert!(store.load().is_err());
  }
}
