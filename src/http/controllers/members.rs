use actix_web::{web, HttpResponse};

use crate::{
  http::Error,
  schema::User,
  types::{
    form::members::{MemberSummary, Response},
    Envelope,
  },
  App,
};

/// `GET /api/members`. Everyone, ranked by points descending with
/// join date breaking ties; levels are derived per row, the
/// credential column never leaves this function.
#[tracing::instrument(skip_all)]
pub async fn list(app: web::Data<App>) -> Result<HttpResponse, Error> {
  let mut conn = app.db_read().await?;
  let users = User::list_by_rank(&mut conn).await?;

  let members = users
    .into_iter()
    .map(|user| MemberSummary {
      id: user.id,
      username: user.name.clone(),
      role: user.role,
      level: user.level(),
      points: user.points,
      created_at: user.created_at,
    })
    .collect();

  Ok(HttpResponse::Ok().json(Envelope::ok(Response { members })))
}
