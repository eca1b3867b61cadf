use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::{marker::PostMarker, Id};

/// One approved post as it appears on the board: joined with the
/// author's public name and the level derived from their points.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostSummary {
  pub id: Id<PostMarker>,
  pub title: String,
  pub views: i64,
  pub created_at: NaiveDateTime,
  pub category: String,
  pub author_name: String,
  pub level: u8,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub posts: Vec<PostSummary>,
}
