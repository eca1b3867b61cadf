pub mod auth;
pub mod members;
pub mod posts;
pub mod upload;
