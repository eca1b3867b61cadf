use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;

use super::Error;
use crate::{
  blob,
  database::{self, ErrorExt2},
  http::jwt::IssueTokenError,
  types::{validation::FieldErrors, Error as ErrorType},
};

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.error_type {
      ErrorType::InvalidForm(..) | ErrorType::NoFile | ErrorType::FileTooLarge => {
        StatusCode::BAD_REQUEST
      }
      ErrorType::InvalidCredentials | ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
      ErrorType::NotFound => StatusCode::NOT_FOUND,
      ErrorType::DuplicateUser => StatusCode::CONFLICT,
      ErrorType::StorageUnbound | ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse<BoxBody> {
    let status = self.status_code();
    if status.is_server_error() {
      // The report never reaches the wire; this log line is the only
      // place the original failure is visible.
      tracing::error!(error = %self, "request failed");
    }
    HttpResponse::build(status).json(&self.error_type)
  }
}

impl From<Report<database::Error>> for Error {
  fn from(value: Report<database::Error>) -> Self {
    if value.is_unique_violation() {
      Error::from_report(ErrorType::DuplicateUser, value)
    } else {
      Error::from_report(ErrorType::Internal, value)
    }
  }
}

impl From<Report<blob::Error>> for Error {
  fn from(value: Report<blob::Error>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<Report<IssueTokenError>> for Error {
  fn from(value: Report<IssueTokenError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<FieldErrors> for Error {
  fn from(value: FieldErrors) -> Self {
    Error::new(ErrorType::InvalidForm(value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::ResponseError;

  #[test]
  fn categories_map_to_their_status_codes() {
    let cases = [
      (Error::new(ErrorType::NoFile), StatusCode::BAD_REQUEST),
      (Error::new(ErrorType::Unauthorized), StatusCode::UNAUTHORIZED),
      (
        Error::new(ErrorType::InvalidCredentials),
        StatusCode::UNAUTHORIZED,
      ),
      (Error::new(ErrorType::NotFound), StatusCode::NOT_FOUND),
      (Error::new(ErrorType::DuplicateUser), StatusCode::CONFLICT),
      (
        Error::new(ErrorType::StorageUnbound),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      (
        Error::new(ErrorType::Internal),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];

    for (error, expected) in cases {
      assert_eq!(error.status_code(), expected, "{error:?}");
    }
  }

  #[test]
  fn unique_violations_become_conflicts() {
    let report = Report::new(database::Error::UniqueViolation);
    let error = Error::from(report);
    assert_eq!(error.status_code(), StatusCode::CONFLICT);

    let report = Report::new(database::Error::UnhealthyPool);
    let error = Error::from(report);
    assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
