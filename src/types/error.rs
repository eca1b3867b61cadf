use serde::ser::SerializeMap;
use thiserror::Error;

use super::validation::FieldErrors;

/// Client-facing error categories. The `Display` text is exactly what
/// ends up in the failure envelope's `message` field; anything more
/// specific stays in the server-side report.
#[derive(Debug, Error)]
pub enum Error {
  /// One or more request fields were rejected before any store
  /// interaction.
  #[error("Some fields were rejected")]
  InvalidForm(FieldErrors),
  /// The multipart body had no usable `file` field.
  #[error("No file was uploaded")]
  NoFile,
  /// The uploaded file is bigger than the server accepts.
  #[error("The uploaded file is too large")]
  FileTooLarge,
  /// Same message for an unknown username and a wrong password, so
  /// responses cannot be used to probe which usernames exist.
  #[error("Invalid username or password")]
  InvalidCredentials,
  #[error("Authentication required, please sign in")]
  Unauthorized,
  #[error("Username or email is already in use")]
  DuplicateUser,
  #[error("API endpoint not found")]
  NotFound,
  /// The deployment has no `[blob]` section configured.
  #[error("Storage bucket is not configured")]
  StorageUnbound,
  #[error("Internal server error")]
  Internal,
}

impl serde::Serialize for Error {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("success", &false)?;
    map.serialize_entry("message", &self.to_string())?;
    if let Error::InvalidForm(fields) = self {
      map.serialize_entry("errors", fields)?;
    }
    map.end()
  }
}
