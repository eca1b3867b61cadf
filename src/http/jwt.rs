use chrono::Utc;
use error_stack::{Result, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  config,
  types::id::{marker::UserMarker, Id},
};

const ISSUER: &str = "agora";

#[derive(Debug, Error)]
#[error("Failed to issue bearer token")]
pub struct IssueTokenError;

#[derive(Debug, Error)]
#[error("Rejected bearer token")]
pub struct VerifyTokenError;

/// Claims carried by a bearer token. Tokens are HS512-signed and
/// time-bound; an expired or tampered token simply fails
/// verification and the request proceeds unauthenticated.
#[derive(Debug, Deserialize, Serialize)]
pub struct Jwt {
  pub user_id: Id<UserMarker>,
  pub iat: i64,
  pub exp: i64,
  pub iss: String,
}

impl Jwt {
  #[tracing::instrument(skip_all)]
  pub fn issue(user_id: Id<UserMarker>, auth: &config::Auth) -> Result<String, IssueTokenError> {
    let now = Utc::now().timestamp();
    let claims = Self {
      user_id,
      iat: now,
      exp: now + auth.token_ttl_secs.get() as i64,
      iss: ISSUER.to_string(),
    };

    let header = Header::new(Algorithm::HS512);
    let key = EncodingKey::from_secret(auth.jwt_secret.as_str().as_bytes());
    jsonwebtoken::encode(&header, &claims, &key).change_context(IssueTokenError)
  }

  #[tracing::instrument(skip_all)]
  pub fn verify(token: &str, auth: &config::Auth) -> Result<Self, VerifyTokenError> {
    let key = DecodingKey::from_secret(auth.jwt_secret.as_str().as_bytes());
    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[ISSUER]);

    jsonwebtoken::decode::<Self>(token, &key, &validation)
      .map(|data| data.claims)
      .change_context(VerifyTokenError)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::num::NonZeroU64;

  fn auth_config(ttl_secs: u64) -> config::Auth {
    config::Auth {
      jwt_secret: "an-adequately-long-test-secret".to_string().into(),
      token_ttl_secs: NonZeroU64::new(ttl_secs).expect("nonzero ttl"),
    }
  }

  #[test]
  fn issued_tokens_verify_back_to_the_same_user() {
    let auth = auth_config(600);
    let token = Jwt::issue(Id::new(42), &auth).expect("issue");

    let claims = Jwt::verify(&token, &auth).expect("verify");
    assert_eq!(claims.user_id, Id::new(42));
    assert_eq!(claims.iss, ISSUER);
    assert!(claims.exp > claims.iat);
  }

  #[test]
  fn tokens_from_another_secret_are_rejected() {
    let token = Jwt::issue(Id::new(42), &auth_config(600)).expect("issue");

    let other = config::Auth {
      jwt_secret: "a-completely-different-secret".to_string().into(),
      token_ttl_secs: NonZeroU64::new(600).expect("nonzero ttl"),
    };
    assert!(Jwt::verify(&token, &other).is_err());
  }

  #[test]
  fn garbage_tokens_are_rejected() {
    assert!(Jwt::verify("42", &auth_config(600)).is_err());
    assert!(Jwt::verify("not.a.jwt", &auth_config(600)).is_err());
  }

  #[test]
  fn expired_tokens_are_rejected() {
    let auth = auth_config(600);

    // Issue a token that ran out two hours ago, far past any leeway.
    let now = Utc::now().timestamp();
    let claims = Jwt {
      user_id: Id::new(42),
      iat: now - 7800,
      exp: now - 7200,
      iss: ISSUER.to_string(),
    };
    let header = Header::new(Algorithm::HS512);
    let key = EncodingKey::from_secret(auth.jwt_secret.as_str().as_bytes());
    let token = jsonwebtoken::encode(&header, &claims, &key).expect("encode");

    assert!(Jwt::verify(&token, &auth).is_err());
  }
}
