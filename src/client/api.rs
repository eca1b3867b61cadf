use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::session::SessionStore;
use crate::types::{envelope::Empty, Envelope};

/// Message of the synthetic envelope a 401 turns into. The original
/// failure never propagates; callers only ever see this notice.
pub const SESSION_EXPIRED: &str = "Your session has expired, please sign in again";

/// Client for the `/api` surface. Every call goes through
/// [`ApiClient::send`], so the stored token rides along when a
/// session exists and a 401 wipes that session before the caller sees
/// anything. No method returns a transport-level error: whatever goes
/// wrong comes back as a failure envelope.
#[derive(Debug)]
pub struct ApiClient<S> {
  http: reqwest::Client,
  base_url: String,
  store: S,
}

impl<S: SessionStore> ApiClient<S> {
  #[must_use]
  pub fn new(base_url: impl Into<String>, store: S) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      store,
    }
  }

  /// The injected session persistence seam, for sign-in and sign-out.
  #[must_use]
  pub fn store(&self) -> &S {
    &self.store
  }

  fn url(&self, endpoint: &str) -> String {
    format!("{}{endpoint}", self.base_url)
  }

  pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Envelope<T> {
    self.send(self.http.get(self.url(endpoint))).await
  }

  pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Envelope<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    self.send(self.http.post(self.url(endpoint)).json(body)).await
  }

  /// Multipart upload under the one field name the server accepts.
  pub async fn upload<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    filename: &str,
    bytes: Vec<u8>,
    content_type: &mime::Mime,
  ) -> Envelope<T> {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    let part = match part.mime_str(content_type.as_ref()) {
      Ok(part) => part,
      Err(error) => {
        return Envelope::failure(format!("Unusable content type for {filename:?}: {error}"))
      }
    };

    let form = reqwest::multipart::Form::new().part("file", part);
    self.send(self.http.post(self.url(endpoint)).multipart(form)).await
  }

  async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Envelope<T> {
    let request = match self.store.load() {
      Ok(Some(session)) => request.bearer_auth(session.token.as_str()),
      Ok(None) => request,
      // An unreadable session file degrades to an anonymous call.
      Err(report) => {
        tracing::debug!("session store unreadable: {report:?}");
        request
      }
    };

    let response = match request.send().await {
      Ok(response) => response,
      Err(error) => return Envelope::failure(format!("Could not reach the server: {error}")),
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
      // Forced logout: the token and the user record leave together.
      if let Err(report) = self.store.clear() {
        tracing::debug!("could not clear the session: {report:?}");
      }
      return Envelope::failure(SESSION_EXPIRED);
    }

    if status.is_success() {
      match response.json::<Envelope<T>>().await {
        Ok(envelope) => envelope,
        Err(error) => Envelope::failure(format!("The server answered with invalid JSON: {error}")),
      }
    } else {
      let message = response
        .json::<Envelope<Empty>>()
        .await
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| format!("Request failed with status {status}"));
      Envelope::failure(message)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::session::{MemoryStore, Session};
  use crate::schema::user::Role;
  use crate::types::form::auth::AccountSummary;
  use crate::types::id::Id;
  use serde::Deserialize;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::sync::mpsc;

  #[derive(Debug, PartialEq, Deserialize)]
  struct Payload {
    count: u32,
  }

  fn session() -> Session {
    Session {
      token: "signed.jwt.token".to_string().into(),
      user: AccountSummary {
        id: Id::new(7),
        username: "salmon-ella".to_string(),
        points: 120,
        level: 2,
        role: Role::Member,
      },
    }
  }

  /// Canned HTTP responder: answers every connection with the given
  /// status line and JSON body and forwards the raw request text.
  async fn canned_server(
    status_line: &'static str,
    body: &'static str,
  ) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      while let Ok((mut socket, ..)) = listener.accept().await {
        let mut buf = vec![0u8; 16 * 1024];
        let read = socket.read(&mut buf).await.unwrap_or(0);
        let _ = tx.send(String::from_utf8_lossy(&buf[..read]).into_owned());

        let response = format!(
          "HTTP/1.1 {status_line}\r\n\
           content-type: application/json\r\n\
           content-length: {len}\r\n\
           connection: close\r\n\r\n{body}",
          len = body.len(),
        );
        let _ = socket.write_all(response.as_bytes()).await;
      }
    });

    (format!("http://{addr}"), rx)
  }

  #[tokio::test]
  async fn success_envelopes_come_back_as_is() {
    let (base, ..) = canned_server("200 OK", r#"{"success":true,"message":"hello","count":3}"#).await;
    let client = ApiClient::new(base, MemoryStore::new());

    let envelope: Envelope<Payload> = client.get("/api/posts").await;
    assert!(envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("hello"));
    assert_eq!(envelope.data, Some(Payload { count: 3 }));
  }

  #[tokio::test]
  async fn the_stored_token_rides_every_request() {
    let (base, mut seen) = canned_server("200 OK", r#"{"success":true}"#).await;
    let client = ApiClient::new(base, MemoryStore::new());
    client.store().save(&session()).expect("save");

    let _: Envelope<Empty> = client.get("/api/posts").await;

    let request = seen.recv().await.expect("request captured").to_ascii_lowercase();
    assert!(
      request.contains("authorization: bearer signed.jwt.token"),
      "no bearer header in:\n{request}"
    );
  }

  #[tokio::test]
  async fn anonymous_requests_carry_no_authorization_header() {
    let (base, mut seen) = canned_server("200 OK", r#"{"success":true}"#).await;
    let client = ApiClient::new(base, MemoryStore::new());

    let _: Envelope<Empty> = client.get("/api/posts").await;

    let request = seen.recv().await.expect("request captured").to_ascii_lowercase();
    assert!(!request.contains("authorization:"));
  }

  #[tokio::test]
  async fn a_401_clears_the_session_and_synthesizes_a_failure() {
    let (base, ..) = canned_server(
      "401 Unauthorized",
      r#"{"success":false,"message":"Authentication required, please sign in"}"#,
    )
    .await;
    let client = ApiClient::new(base, MemoryStore::new());
    client.store().save(&session()).expect("save");

    let envelope: Envelope<Empty> = client.get("/api/posts").await;
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some(SESSION_EXPIRED));

    // The forced logout dropped both halves of the session.
    assert_eq!(client.store().load().expect("load"), None);
  }

  #[tokio::test]
  async fn other_failures_carry_the_servers_message_and_keep_the_session() {
    let (base, ..) = canned_server(
      "409 Conflict",
      r#"{"success":false,"message":"Username or email is already in use"}"#,
    )
    .await;
    let client = ApiClient::new(base, MemoryStore::new());
    client.store().save(&session()).expect("save");

    let envelope: Envelope<Empty> = client.get("/api/posts").await;
    assert!(!envelope.success);
    assert_eq!(
      envelope.message.as_deref(),
      Some("Username or email is already in use")
    );
    assert_eq!(client.store().load().expect("load"), Some(session()));
  }

  #[tokio::test]
  async fn transport_failures_become_failure_envelopes() {
    // Nothing listens on port 1; the connection is refused outright.
    let client = ApiClient::new("http://127.0.0.1:1", MemoryStore::new());

    let envelope: Envelope<Empty> = client.get("/api/posts").await;
    assert!(!envelope.success);
    assert!(envelope.message.is_some());
  }
}
