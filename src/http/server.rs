use actix_files::Files;
use actix_web::http::Method;
use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

use super::{controllers, util};
use crate::{config, App};

#[derive(Debug, Error)]
#[error("Failed to start HTTP server")]
pub struct StartServerError;

/// Brings the whole surface up: the `/api` dispatch table, the global
/// `OPTIONS` short-circuit, the re-served upload objects and the
/// static-asset fallback for everything else.
pub async fn run(config: config::Server) -> Result<(), StartServerError> {
  let app = App::new(config).await.change_context(StartServerError)?;

  let bind_addr = (app.config.http.ip, app.config.http.port);
  let workers = app.config.http.workers;

  tracing::info!(
    "listening on http://{}:{}",
    app.config.http.ip,
    app.config.http.port
  );

  let mut server = HttpServer::new(move || {
    let blob_cfg = app.config.blob.as_ref();
    let assets_dir = app.config.assets.dir.clone();

    let mut web_app = actix_web::App::new()
      .app_data(web::Data::new(app.clone()))
      .wrap(TracingLogger::<util::QuieterRootSpanBuilder>::new())
      // Registered ahead of everything so OPTIONS never reaches the
      // dispatch table or the static collaborator.
      .route(
        "/{tail:.*}",
        web::route().method(Method::OPTIONS).to(util::preflight),
      )
      .configure(controllers::configure);

    if let Some(blob) = blob_cfg {
      web_app = web_app.service(Files::new(&blob.public_prefix, &blob.root));
    }

    web_app.service(Files::new("/", assets_dir).index_file("index.html"))
  });

  if let Some(workers) = workers {
    server = server.workers(workers.get());
  }

  server
    .bind(bind_addr)
    .change_context(StartServerError)?
    .run()
    .await
    .change_context(StartServerError)
}
