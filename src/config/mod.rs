use thiserror::Error;

mod blob;
mod database;
mod server;

pub use blob::Blob;
pub use database::{Database, DbPoolConfig};
pub use server::{Assets, Auth, Http, Server};

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
