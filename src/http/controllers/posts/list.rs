use actix_web::{web, HttpResponse};

use crate::{
  http::Error,
  schema::Post,
  types::{
    form::posts::list::{PostSummary, Response},
    level::level_for,
    Envelope,
  },
  App,
};

/// Page size of the public board.
const BOARD_LIMIT: i64 = 20;

/// `GET /api/posts`. Approved posts only, newest first, at most
/// twenty rows; each row carries the author's name and derived level.
#[tracing::instrument(skip_all)]
pub async fn list(app: web::Data<App>) -> Result<HttpResponse, Error> {
  let mut conn = app.db_read().await?;
  let rows = Post::list_approved(&mut conn, BOARD_LIMIT).await?;

  let posts = rows
    .into_iter()
    .map(|row| PostSummary {
      id: row.id,
      title: row.title,
      views: row.views,
      created_at: row.created_at,
      category: row.category,
      author_name: row.author_name,
      level: level_for(row.author_points),
    })
    .collect();

  Ok(HttpResponse::Ok().json(Envelope::ok(Response { posts })))
}
