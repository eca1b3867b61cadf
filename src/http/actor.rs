use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{http::Jwt, schema::User, App};

use super::Error;

/// The per-request authorization verdict: either a fully loaded user
/// record or nobody. Computed fresh on every extraction (exactly one
/// store lookup when a plausible token is present) and never cached.
///
/// Every failure mode along the way collapses into `Anonymous`: a
/// missing header, a non-`Bearer` scheme, a token that fails
/// signature or expiry checks, or a subject id with no user behind it.
#[derive(Debug)]
pub enum Actor {
  Anonymous,
  User(User),
}

impl Actor {
  pub fn get_user(self) -> Result<User, Error> {
    #[derive(Debug, Error)]
    #[error("Attempt to access user-only route")]
    struct Unauthorized;
    match self {
      Self::User(n) => Ok(n),
      Self::Anonymous => Err(Error::from_context(
        crate::types::Error::Unauthorized,
        Unauthorized,
      )),
    }
  }
}

impl FromRequest for Actor {
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(
    req: &actix_web::HttpRequest,
    _payload: &mut actix_web::dev::Payload,
  ) -> Self::Future {
    let token = req
      .headers()
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
      let Some(app) = req.app_data::<web::Data<App>>() else {
        #[derive(Debug, Error)]
        #[error("The web app has no available configuration")]
        struct NoConfig;
        return Box::pin(ready(Err(Error::from_context(
          crate::types::Error::Internal,
          NoConfig,
        ))));
      };

      let app = app.clone();
      let Ok(jwt) = Jwt::verify(token, &app.config.auth) else {
        return Box::pin(ready(Ok(Actor::Anonymous)));
      };

      Box::pin(async move {
        let mut conn = app.db_read_prefer_primary().await?;
        if let Some(user) = User::by_id(&mut conn, jwt.user_id).await? {
          Ok(Actor::User(user))
        } else {
          Ok(Actor::Anonymous)
        }
      })
    } else {
      Box::pin(ready(Ok(Actor::Anonymous)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{http::StatusCode, ResponseError};
  use chrono::NaiveDate;

  use crate::schema::user::Role;
  use crate::types::id::Id;

  // The user-only handlers call `get_user` before touching any
  // collaborator, so this rejection is what keeps anonymous uploads
  // and submissions away from the stores entirely.
  #[test]
  fn anonymous_actors_are_turned_away_with_a_401() {
    let error = Actor::Anonymous.get_user().expect_err("must be rejected");
    assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
  }

  #[test]
  fn signed_in_actors_yield_their_record() {
    let created_at = NaiveDate::from_ymd_opt(2024, 3, 1)
      .and_then(|d| d.and_hms_opt(12, 0, 0))
      .expect("valid timestamp");

    let user = User {
      id: Id::new(7),
      created_at,
      name: "salmon-ella".to_string(),
      email: "sal@example.com".to_string(),
      password_hash: "$argon2id$stub".to_string(),
      points: 120,
      role: Role::Member,
      updated_at: None,
    };

    let yielded = Actor::User(user).get_user().expect("signed in");
    assert_eq!(yielded.name, "salmon-ella");
  }
}
