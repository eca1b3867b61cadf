use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  /// Public URL the uploaded object is served back under.
  pub url: String,
}
