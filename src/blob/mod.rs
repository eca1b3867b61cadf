use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::config;

pub type Result<T> = error_stack::Result<T, Error>;

/// Blob store related errors
#[derive(Debug, Error)]
pub enum Error {
  /// Keys are relative paths; anything that could escape the store
  /// root is refused outright.
  #[error("refusing to store object under this key")]
  InvalidKey,
  #[error("failed to write object: {0}")]
  Io(std::io::Error),
}

/// The object storage collaborator: a key-addressed put, nothing more.
/// Uploads go through this seam so the HTTP layer never learns what
/// backs it.
#[async_trait]
pub trait BlobStore: std::fmt::Debug + Send + Sync {
  /// Writes `bytes` under `key`, replacing any existing object.
  async fn put(&self, key: &str, bytes: &[u8], content_type: &mime::Mime) -> Result<()>;
}

/// Filesystem-backed store: one file per key under a configured root.
/// Served back by the static-file service, which derives the content
/// type from the key's extension; the `content_type` argument is kept
/// for backends that store it as real metadata.
#[derive(Debug)]
pub struct FsStore {
  root: PathBuf,
}

impl FsStore {
  #[must_use]
  pub fn new(cfg: &config::Blob) -> Self {
    Self {
      root: cfg.root.clone(),
    }
  }

  fn resolve(&self, key: &str) -> Result<PathBuf> {
    let relative = Path::new(key);
    let sane = relative
      .components()
      .all(|c| matches!(c, Component::Normal(..)));

    if key.is_empty() || !sane {
      return Err(Report::new(Error::InvalidKey).attach_printable(format!("key = {key:?}")));
    }
    Ok(self.root.join(relative))
  }
}

#[async_trait]
impl BlobStore for FsStore {
  #[tracing::instrument(name = "blob.put", skip(bytes), fields(size = bytes.len()))]
  async fn put(&self, key: &str, bytes: &[u8], _content_type: &mime::Mime) -> Result<()> {
    let path = self.resolve(key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| Report::new(Error::Io(e)))
        .attach_printable_lazy(|| format!("key = {key:?}"))?;
    }

    tokio::fs::write(&path, bytes)
      .await
      .map_err(|e| Report::new(Error::Io(e)))
      .attach_printable_lazy(|| format!("key = {key:?}"))?;

    Ok(())
  }
}

/// Upload keys mirror the original layout: a fixed prefix, the upload
/// instant in milliseconds and the client's file name. Collisions are
/// possible within one millisecond and accepted for this scope.
#[must_use]
pub fn object_key(filename: &str, now_millis: i64) -> String {
  // Strip any path the client smuggled into the file name.
  let filename = filename
    .rsplit(['/', '\\'])
    .next()
    .filter(|name| !name.is_empty() && *name != "." && *name != "..")
    .unwrap_or("upload.bin");

  format!("uploads/{now_millis}-{filename}")
}

/// Joins the configured public prefix with an object key.
#[must_use]
pub fn public_url(prefix: &str, key: &str) -> String {
  format!("{}/{key}", prefix.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store(root: &Path) -> FsStore {
    FsStore::new(&config::Blob {
      root: root.to_path_buf(),
      public_prefix: "/media".to_string(),
    })
  }

  #[tokio::test]
  async fn put_writes_one_file_per_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store(dir.path());

    store
      .put("uploads/1-cat.png", b"meow", &mime::IMAGE_PNG)
      .await
      .expect("put");

    let written = std::fs::read(dir.path().join("uploads/1-cat.png")).expect("read back");
    assert_eq!(written, b"meow");
  }

  #[tokio::test]
  async fn rejects_keys_that_escape_the_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store(dir.path());

    for key in ["../outside", "/etc/passwd", ""] {
      let result = store.put(key, b"x", &mime::APPLICATION_OCTET_STREAM).await;
      assert!(result.is_err(), "key {key:?} was accepted");
    }
  }

  #[test]
  fn object_keys_carry_prefix_instant_and_name() {
    assert_eq!(
      object_key("avatar.png", 1_700_000_000_000),
      "uploads/1700000000000-avatar.png"
    );
  }

  #[test]
  fn object_keys_drop_client_supplied_paths() {
    assert_eq!(
      object_key("../../etc/passwd", 5),
      "uploads/5-passwd"
    );
    assert_eq!(object_key("..", 5), "uploads/5-upload.bin");
    assert_eq!(object_key("", 5), "uploads/5-upload.bin");
  }

  #[test]
  fn public_urls_join_cleanly() {
    assert_eq!(public_url("/media", "uploads/5-a.png"), "/media/uploads/5-a.png");
    assert_eq!(public_url("/media/", "uploads/5-a.png"), "/media/uploads/5-a.png");
  }
}
