use serde::{Deserialize, Serialize};

/// The uniform response shape every handler speaks:
/// `{ "success": bool, "message"?: string, ...payload }`.
///
/// Consumers rely on being able to parse any response as JSON with a
/// `success` field, so success and failure both go through this type
/// (failures through [`failure`](Envelope::failure) or through the
/// error type's own serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(flatten)]
  pub data: Option<T>,
}

/// Payload for envelopes that carry nothing but the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl<T> Envelope<T> {
  #[must_use]
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      message: None,
      data: Some(data),
    }
  }

  #[must_use]
  pub fn ok_with(message: impl Into<String>, data: T) -> Self {
    Self {
      success: true,
      message: Some(message.into()),
      data: Some(data),
    }
  }

  #[must_use]
  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      message: Some(message.into()),
      data: None,
    }
  }
}

impl Envelope<Empty> {
  #[must_use]
  pub fn message_only(message: impl Into<String>) -> Self {
    Self {
      success: true,
      message: Some(message.into()),
      data: None,
    }
  }
}
