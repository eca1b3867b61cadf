use serde::{Deserialize, Serialize};

use super::AccountSummary;
use crate::types::validation::{FieldErrors, Validate};
use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub username: String,
  pub password: Sensitive<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), FieldErrors> {
    let mut fields = FieldErrors::new();
    if self.username.is_empty() || self.username.len() > 128 {
      fields.insert("username", "Invalid username");
    }
    if self.password.as_str().is_empty() {
      fields.insert("password", "Password is required");
    }
    fields.into_result()
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub token: Sensitive<String>,
  pub user: AccountSummary,
}
