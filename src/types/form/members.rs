use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schema::user::Role;
use crate::types::id::{marker::UserMarker, Id};

/// One row of the member board, ranked by points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemberSummary {
  pub id: Id<UserMarker>,
  pub username: String,
  pub role: Role,
  pub level: u8,
  pub points: i64,
  pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub members: Vec<MemberSummary>,
}
