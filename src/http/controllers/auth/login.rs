use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use thiserror::Error;
use tokio::task::spawn_blocking;

use crate::{
  http::{Error, Jwt},
  schema::User,
  types::{
    form::auth::{login, AccountSummary},
    validation::Validate,
    Envelope,
  },
  util::password,
  App,
};

#[derive(Debug, Error)]
#[error("Login attempt with invalid credentials")]
struct BadCredentials;

/// `POST /api/auth/login`. An unknown username and a wrong password
/// take the exact same 401 exit so the response cannot be used to
/// enumerate accounts.
#[tracing::instrument(skip_all)]
pub async fn login(app: web::Data<App>, form: Json<login::Request>) -> Result<HttpResponse, Error> {
  form.validate()?;

  // We need to get the latest info as soon as possible
  let mut conn = app.db_read_prefer_primary().await?;

  let Some(user) = User::by_name(&mut conn, &form.username).await? else {
    return Err(Error::from_context(
      crate::types::Error::InvalidCredentials,
      BadCredentials,
    ));
  };

  drop(conn);

  let matched = spawn_blocking({
    let password = form.password.as_str().to_string();
    let hash = user.password_hash.clone();
    move || password::verify(&password, &hash)
  })
  .await
  .map_err(|e| Error::from_context(crate::types::Error::Internal, e))?
  .map_err(|report| Error::from_report(crate::types::Error::Internal, report))?;

  if !matched {
    return Err(Error::from_context(
      crate::types::Error::InvalidCredentials,
      BadCredentials,
    ));
  }

  let token = Jwt::issue(user.id, &app.config.auth)?;
  let summary = AccountSummary {
    id: user.id,
    username: user.name.clone(),
    points: user.points,
    level: user.level(),
    role: user.role,
  };

  Ok(HttpResponse::Ok().json(Envelope::ok_with(
    "Signed in successfully",
    login::Response {
      token: token.into(),
      user: summary,
    },
  )))
}
