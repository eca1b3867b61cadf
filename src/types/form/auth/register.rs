use serde::{Deserialize, Serialize};

use crate::types::id::{marker::UserMarker, Id};
use crate::types::validation::{is_valid_email, is_valid_password, is_valid_username, FieldErrors, Validate};
use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub username: String,
  pub email: String,
  pub password: Sensitive<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), FieldErrors> {
    let mut fields = FieldErrors::new();
    if !is_valid_username(&self.username) {
      fields.insert("username", "Invalid username");
    }
    if !is_valid_email(&self.email) {
      fields.insert("email", "Invalid e-mail address");
    }

    // All passwords must have no trailing or leading whitespaces
    let password = self.password.as_str();
    if password.trim().len() != password.len() {
      fields.insert("password", "Passwords must not start or end with spaces");
    } else if !is_valid_password(password) {
      fields.insert("password", "Passwords must be between 8 and 128 characters");
    }

    fields.into_result()
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  #[serde(rename = "userId")]
  pub user_id: Id<UserMarker>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(username: &str, email: &str, password: &str) -> Request {
    Request {
      username: username.to_string(),
      email: email.to_string(),
      password: password.to_string().into(),
    }
  }

  #[test]
  fn accepts_a_reasonable_signup() {
    assert!(request("salmon-ella", "sal@example.com", "not_telling_you").validate().is_ok());
  }

  #[test]
  fn rejects_bad_fields() {
    assert!(request("pretty ugly", "sal@example.com", "not_telling_you").validate().is_err());
    assert!(request("salmon-ella", "not-an-email", "not_telling_you").validate().is_err());
    assert!(request("salmon-ella", "sal@example.com", "short").validate().is_err());
    assert!(request("salmon-ella", "sal@example.com", " padded_password ").validate().is_err());
  }

  #[test]
  fn user_id_keeps_its_wire_name() {
    let response = Response {
      user_id: Id::new(7),
    };
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json, serde_json::json!({ "userId": 7 }));
  }
}
