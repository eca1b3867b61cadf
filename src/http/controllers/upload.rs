use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;

use crate::{
  blob,
  http::{Actor, Error},
  types::{form::upload, Envelope},
  App,
};

/// Hard cap on a single upload; multipart bodies stream in chunks so
/// this is enforced while reading, not after.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
#[error("Multipart body could not be read")]
struct BrokenMultipart;

fn broken_multipart(e: &actix_multipart::MultipartError) -> Error {
  tracing::debug!("rejected multipart body: {e}");
  Error::from_context(crate::types::Error::NoFile, BrokenMultipart)
}

/// `POST /api/upload`. The authentication check comes first — an
/// anonymous caller is turned away before the blob store is even
/// looked at. The one accepted field is `file`; its bytes go to the
/// store under a millisecond-stamped key and the public URL comes
/// back in the envelope.
#[tracing::instrument(skip_all)]
pub async fn upload(
  app: web::Data<App>,
  actor: Actor,
  mut payload: Multipart,
) -> Result<HttpResponse, Error> {
  let _uploader = actor.get_user()?;

  let (Some(store), Some(blob_cfg)) = (app.blob.as_ref(), app.config.blob.as_ref()) else {
    return Err(Error::new(crate::types::Error::StorageUnbound));
  };

  let mut file: Option<(String, mime::Mime, Vec<u8>)> = None;

  while let Some(mut field) = payload.try_next().await.map_err(|e| broken_multipart(&e))? {
    if field.content_disposition().get_name() != Some("file") {
      continue;
    }

    let Some(filename) = field
      .content_disposition()
      .get_filename()
      .map(str::to_owned)
    else {
      // A bare form value under the `file` name, not an actual file.
      continue;
    };

    let content_type = field
      .content_type()
      .cloned()
      .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk.map_err(|e| broken_multipart(&e))?;
      if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
        return Err(Error::new(crate::types::Error::FileTooLarge));
      }
      bytes.extend_from_slice(&chunk);
    }

    file = Some((filename, content_type, bytes));
    break;
  }

  let Some((filename, content_type, bytes)) = file else {
    return Err(Error::new(crate::types::Error::NoFile));
  };

  let key = blob::object_key(&filename, Utc::now().timestamp_millis());
  store.put(&key, &bytes, &content_type).await?;

  let url = blob::public_url(&blob_cfg.public_prefix, &key);
  Ok(HttpResponse::Ok().json(Envelope::ok_with(
    "File uploaded successfully",
    upload::Response { url },
  )))
}
