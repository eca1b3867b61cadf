use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{
  http::{Actor, Error},
  schema::post::{NewPost, Post},
  types::{form::posts::publish, validation::Validate, Envelope},
  App,
};

/// `POST /api/posts`. Requires a signed-in author; the submission
/// always lands in the review queue — the insert never takes a status
/// from the client.
#[tracing::instrument(skip_all)]
pub async fn publish(
  app: web::Data<App>,
  actor: Actor,
  form: Json<publish::Request>,
) -> Result<HttpResponse, Error> {
  let author = actor.get_user()?;
  form.validate()?;

  let mut conn = app.db_write().await?;
  Post::insert(
    &mut conn,
    NewPost {
      author_id: author.id,
      category: &form.category,
      title: &form.title,
      content: &form.content,
    },
  )
  .await?;

  Ok(HttpResponse::Ok().json(Envelope::message_only("Post submitted for review")))
}
