use serde::{Deserialize, Serialize};

/// Wrapper for values that must not leak into logs or `Debug` output,
/// like passwords, tokens and connection URLs with inline credentials.
///
/// It serializes transparently; redaction only applies to [`Debug`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
  #[must_use]
  pub const fn new(value: T) -> Self {
    Self(value)
  }

  #[must_use]
  pub fn value(&self) -> &T {
    &self.0
  }

  #[must_use]
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl Sensitive<String> {
  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl<T> From<T> for Sensitive<T> {
  fn from(value: T) -> Self {
    Self(value)
  }
}

impl<T> std::ops::Deref for Sensitive<T> {
  type Target = T;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl<T> std::fmt::Debug for Sensitive<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Sensitive(<hidden>)")
  }
}
