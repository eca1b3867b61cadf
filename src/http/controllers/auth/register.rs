use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use tokio::task::spawn_blocking;

use crate::{
  http::Error,
  schema::user::{NewUser, User},
  types::{form::auth::register, validation::Validate, Envelope},
  util::password,
  App,
};

/// `POST /api/auth/register`. One insert; duplicate usernames and
/// emails are caught by the store's unique constraints and surface as
/// a 409, everything else as a 500.
#[tracing::instrument(skip_all)]
pub async fn register(
  app: web::Data<App>,
  form: Json<register::Request>,
) -> Result<HttpResponse, Error> {
  form.validate()?;
  let form = form.into_inner();

  let password_hash = spawn_blocking({
    let password = form.password.as_str().to_string();
    move || password::hash(&password)
  })
  .await
  .map_err(|e| Error::from_context(crate::types::Error::Internal, e))?
  .map_err(|report| Error::from_report(crate::types::Error::Internal, report))?;

  let mut conn = app.db_write().await?;
  let new_user = User::insert(
    &mut conn,
    NewUser {
      name: &form.username,
      email: &form.email,
      password_hash: &password_hash,
    },
  )
  .await?;

  Ok(HttpResponse::Ok().json(Envelope::ok_with(
    "Registration successful",
    register::Response {
      user_id: new_user.id,
    },
  )))
}
