//! Terminal client for the forum API: a request helper carrying the
//! two cross-cutting behaviors (token attachment, forced logout on
//! 401), an explicit session persisted through an injected store, and
//! pure rendering of board rows.

pub mod api;
pub mod render;
pub mod session;

pub use api::ApiClient;
pub use session::{Session, SessionStore};
