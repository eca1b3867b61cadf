use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, ErrorHandlerResponse};
use actix_web::HttpResponse;
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

use crate::types::Envelope;

/// The headers the original surface promised on every API response,
/// wide open on purpose: any origin may talk to the forum.
pub const CORS_HEADERS: [(&str, &str); 3] = [
  ("Access-Control-Allow-Origin", "*"),
  ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
  ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// Middleware stamping the CORS headers on every response that passes
/// through the `/api` scope, error paths included.
#[must_use]
pub fn cors_headers() -> DefaultHeaders {
  CORS_HEADERS
    .iter()
    .fold(DefaultHeaders::new(), |headers, (name, value)| {
      headers.add((*name, *value))
    })
}

/// Preflight short-circuit: `OPTIONS` anywhere answers an empty 204
/// with the CORS headers before any routing happens.
pub async fn preflight() -> HttpResponse {
  let mut response = HttpResponse::NoContent();
  for (name, value) in CORS_HEADERS {
    response.insert_header((name, value));
  }
  response.finish()
}

/// Rewrites error responses that did not come from the handler error
/// type (malformed JSON bodies, oversized payloads, guard rejections)
/// into the uniform envelope, so `/api` consumers can parse every
/// response the same way. Responses that are already JSON pass
/// through untouched.
pub fn envelope_error_handler<B>(
  res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>>
where
  B: MessageBody + 'static,
{
  let already_json = res
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.starts_with(mime::APPLICATION_JSON.essence_str()))
    .unwrap_or(false);

  if already_json {
    return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
  }

  let status = res.status();
  let message = status.canonical_reason().unwrap_or("Request failed");
  let (req, _) = res.into_parts();

  let envelope = HttpResponse::build(status).json(Envelope::<()>::failure(message));
  let res = ServiceResponse::new(req, envelope).map_into_right_body();
  Ok(ErrorHandlerResponse::Response(res))
}

/// Root span builder that keeps request spans at INFO so per-request
/// noise can be filtered out with `RUST_LOG` without losing errors.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
  fn on_request_start(request: &ServiceRequest) -> Span {
    tracing_actix_web::root_span!(level = tracing::Level::INFO, request)
  }

  fn on_request_end<B: MessageBody>(
    span: Span,
    outcome: &Result<ServiceResponse<B>, actix_web::Error>,
  ) {
    DefaultRootSpanBuilder::on_request_end(span, outcome);
  }
}
