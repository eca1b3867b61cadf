use actix_web::middleware::ErrorHandlers;
use actix_web::{web, HttpResponse};

use super::{util, Error};
use crate::types;

pub mod auth;
pub mod members;
pub mod posts;
pub mod upload;

/// The whole dispatch table. Exact paths only, first match wins.
/// Every resource falls back to the 404 envelope — also on method
/// mismatch, so `DELETE /api/members` answers exactly like an unknown
/// path instead of a bare 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth::register))
          .route("/login", web::post().to(auth::login))
          .default_service(web::route().to(not_found)),
      )
      .service(
        web::resource("/posts")
          .route(web::get().to(posts::list))
          .route(web::post().to(posts::publish))
          .default_service(web::route().to(not_found)),
      )
      .service(
        web::resource("/members")
          .route(web::get().to(members::list))
          .default_service(web::route().to(not_found)),
      )
      .service(
        web::resource("/upload")
          .route(web::post().to(upload::upload))
          .default_service(web::route().to(not_found)),
      )
      .default_service(web::route().to(not_found))
      .wrap(ErrorHandlers::new().default_handler(util::envelope_error_handler))
      .wrap(util::cors_headers()),
  );
}

async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::new(types::Error::NotFound))
}

#[cfg(test)]
mod tests {
  use actix_web::http::{header, Method, StatusCode};
  use actix_web::{test, web, App};

  use crate::http::util;

  // Routing-level behavior that needs no database: the preflight
  // short-circuit and the enveloped 404. Wired exactly like the real
  // server builder.
  macro_rules! test_app {
    () => {
      test::init_service(
        App::new()
          .route(
            "/{tail:.*}",
            web::route().method(Method::OPTIONS).to(util::preflight),
          )
          .configure(super::configure),
      )
      .await
    };
  }

  #[actix_web::test]
  async fn options_shortcircuits_any_path() {
    let app = test_app!();

    for path in ["/api/posts", "/api/nonexistent", "/whatever.html", "/"] {
      let req = test::TestRequest::with_uri(path)
        .method(Method::OPTIONS)
        .to_request();
      let res = test::call_service(&app, req).await;

      assert_eq!(res.status(), StatusCode::NO_CONTENT, "path {path:?}");
      for (name, value) in util::CORS_HEADERS {
        assert_eq!(
          res.headers().get(name).and_then(|v| v.to_str().ok()),
          Some(value),
          "header {name} on {path:?}"
        );
      }

      let body = test::read_body(res).await;
      assert!(body.is_empty(), "preflight body must be empty");
    }
  }

  #[actix_web::test]
  async fn unmatched_api_paths_get_the_404_envelope() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/nonexistent").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      res
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok()),
      Some("*")
    );

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["success"], serde_json::json!(false));
    assert_eq!(body["message"], serde_json::json!("API endpoint not found"));
  }

  #[actix_web::test]
  async fn wrong_method_on_a_known_path_is_unmatched() {
    let app = test_app!();

    let req = test::TestRequest::delete().uri("/api/members").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["success"], serde_json::json!(false));
  }
}
