use serde::{Deserialize, Serialize};

use crate::types::validation::{self, FieldErrors, Validate};

/// A new submission. There is deliberately no `status` field: every
/// post enters the review queue and clients cannot vouch for
/// themselves. Unknown body fields are ignored by deserialization.
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub category: String,
  pub title: String,
  pub content: String,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), FieldErrors> {
    let mut fields = FieldErrors::new();
    if self.category.trim().is_empty() || self.category.len() > validation::CATEGORY_MAX {
      fields.insert("category", "Category is required");
    }
    if self.title.trim().is_empty() || self.title.len() > validation::TITLE_MAX {
      fields.insert("title", "Title must be between 1 and 200 characters");
    }
    if self.content.trim().is_empty() || self.content.len() > validation::CONTENT_MAX {
      fields.insert("content", "Content is missing or too long");
    }
    fields.into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_blank_fields() {
    let form = Request {
      category: "general".to_string(),
      title: "  ".to_string(),
      content: "hello".to_string(),
    };
    assert!(form.validate().is_err());
  }

  #[test]
  fn a_status_field_in_the_body_is_ignored() {
    // Clients may try to smuggle in an approval; the field simply
    // does not survive deserialization.
    let form: Request = serde_json::from_str(
      r#"{"category":"general","title":"hi","content":"body","status":"approved"}"#,
    )
    .expect("deserialize");

    assert!(form.validate().is_ok());
    let back = serde_json::to_value(&form).expect("serialize");
    assert_eq!(back.get("status"), None);
  }
}
