use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{marker::UserMarker, Id},
  types::level,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
  Member,
  Admin,
}

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct User {
  pub id: Id<UserMarker>,
  pub created_at: NaiveDateTime,
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub points: i64,
  pub role: Role,
  pub updated_at: Option<NaiveDateTime>,
}

/// Fields a registration provides; everything else is store-assigned.
#[derive(Debug)]
pub struct NewUser<'a> {
  pub name: &'a str,
  pub email: &'a str,
  pub password_hash: &'a str,
}

impl User {
  /// Forum level derived from the points balance. Never persisted, so
  /// it cannot go stale against `points`.
  #[must_use]
  pub fn level(&self) -> u8 {
    level::level_for(self.points)
  }

  #[tracing::instrument(skip(id), fields(id = "<hidden>"))]
  pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip(condition), fields(condition = "<hidden>"))]
  pub async fn by_name(conn: &mut Connection, condition: &str) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE name = $1"#)
      .bind(condition)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  /// Single insert; uniqueness of name and email is left entirely to
  /// the store's constraints and surfaces as
  /// [`Error::UniqueViolation`](crate::database::Error::UniqueViolation).
  #[tracing::instrument(skip(new_user))]
  pub async fn insert(conn: &mut Connection, new_user: NewUser<'_>) -> Result<Self> {
    sqlx::query_as::<_, Self>(
      r#"INSERT INTO "users" (name, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING *"#,
    )
    .bind(new_user.name)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .fetch_one(conn)
    .await
    .into_db_error()
  }

  /// The member board: everyone, best ranked first, earliest joiner
  /// winning ties.
  #[tracing::instrument(skip_all)]
  pub async fn list_by_rank(conn: &mut Connection) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(
      r#"SELECT * FROM "users" ORDER BY points DESC, created_at ASC"#,
    )
    .fetch_all(conn)
    .await
    .into_db_error()
  }
}
