use serde::Deserialize;
use std::path::PathBuf;

/// Filesystem-backed object storage for uploaded files.
#[derive(Debug, Deserialize)]
pub struct Blob {
    /// Directory the store writes objects into, one file per key.
    ///
    /// **Environment variables**:
    /// - `AGORA_BLOB_ROOT`
    pub root: PathBuf,
    /// URL prefix uploaded objects are served back under.
    ///
    /// **Environment variables**:
    /// - `AGORA_BLOB_PUBLIC_PREFIX`
    #[serde(default = "Blob::default_public_prefix")]
    pub public_prefix: String,
}

impl Blob {
    fn default_public_prefix() -> String {
        "/media".to_string()
    }
}
