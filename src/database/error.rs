use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// An error caused by an invalid Postgres connection
  /// url for either the primary or the replica pool.
  #[error("invalid connection url")]
  InvalidUrl,
  /// An error caused by an [`sqlx`] error.
  #[error("received a pool error: {0}")]
  Internal(sqlx::Error),
  /// An insert collided with a unique constraint. The only unique
  /// columns in the schema are `users.name` and `users.email`, so
  /// callers may treat this as "username or email already taken".
  #[error("unique constraint violated")]
  UniqueViolation,
  /// Either the primary or replica database pools do not
  /// have reliable connection to transact to the database.
  #[error("unhealthy database pool")]
  UnhealthyPool,
  /// Startup migrations could not be applied.
  #[error("failed to run pending migrations: {0}")]
  Migrate(sqlx::migrate::MigrateError),
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| match &e {
      sqlx::Error::Database(err) if err.is_unique_violation() => {
        Report::new(e).change_context(Error::UniqueViolation)
      }
      _ => Report::new(Error::Internal(e)),
    })
  }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Convenience checks over `error_stack::Report<Error>` so callers do
/// not have to spell out the `downcast_ref` dance at every call site.
pub trait ErrorExt2 {
  fn is_unhealthy(&self) -> bool;
  fn is_unique_violation(&self) -> bool;
}

impl ErrorExt2 for error_stack::Report<Error> {
  fn is_unhealthy(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::UnhealthyPool))
      .unwrap_or_default()
  }

  fn is_unique_violation(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::UniqueViolation))
      .unwrap_or_default()
  }
}
