use serde::{Deserialize, Serialize};

use crate::schema::user::Role;
use crate::types::id::{marker::UserMarker, Id};

pub mod login;
pub mod register;

/// The public slice of a user record that travels with a successful
/// sign-in and gets persisted client-side. The credential never
/// appears here; `level` is derived from `points` at response time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountSummary {
  pub id: Id<UserMarker>,
  pub username: String,
  pub points: i64,
  pub level: u8,
  pub role: Role,
}
