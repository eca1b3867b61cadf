use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{marker::PostMarker, marker::UserMarker, Id},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
pub enum PostStatus {
  PendingReview,
  Approved,
}

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Post {
  pub id: Id<PostMarker>,
  pub created_at: NaiveDateTime,
  pub author_id: Id<UserMarker>,
  pub category: String,
  pub title: String,
  pub content: String,
  pub status: PostStatus,
  pub views: i64,
}

/// Fields a submission provides. `status` is not among them: the
/// insert statement leaves it to the store default of
/// `pending_review`, so no caller can publish straight to the board.
#[derive(Debug)]
pub struct NewPost<'a> {
  pub author_id: Id<UserMarker>,
  pub category: &'a str,
  pub title: &'a str,
  pub content: &'a str,
}

/// Row shape of the public board query: post columns joined with the
/// author's name and points (for level derivation).
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct ApprovedPost {
  pub id: Id<PostMarker>,
  pub title: String,
  pub views: i64,
  pub created_at: NaiveDateTime,
  pub category: String,
  pub author_name: String,
  pub author_points: i64,
}

impl Post {
  #[tracing::instrument(skip(new_post))]
  pub async fn insert(conn: &mut Connection, new_post: NewPost<'_>) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "posts" (author_id, category, title, content)
         VALUES ($1, $2, $3, $4)
         RETURNING *"#,
    )
    .bind(new_post.author_id)
    .bind(new_post.category)
    .bind(new_post.title)
    .bind(new_post.content)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  /// The public board: approved posts only, newest first, capped at
  /// `limit` rows.
  #[tracing::instrument(skip_all)]
  pub async fn list_approved(conn: &mut Connection, limit: i64) -> Result<Vec<ApprovedPost>> {
    sqlx::query_as::<_, ApprovedPost>(
      r#"SELECT
           p.id, p.title, p.views, p.created_at, p.category,
           u.name AS author_name, u.points AS author_points
         FROM "posts" p
         INNER JOIN "users" u ON p.author_id = u.id
         WHERE p.status = $1
         ORDER BY p.created_at DESC
         LIMIT $2"#,
    )
    .bind(PostStatus::Approved)
    .bind(limit)
    .fetch_all(conn)
    .await
    .into_db_error()
  }
}
