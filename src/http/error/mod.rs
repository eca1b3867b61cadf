use error_stack::{Context, Report};
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::types;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

/// Common context every carried report is funneled into, so the
/// struct below stays free of type parameters.
#[derive(Debug, Error)]
#[error("request handling failed")]
pub struct Opaque;

/// The handler error type: a client-facing category (which decides
/// status code and envelope message), plus the full server-side
/// report and the span trace it was captured in. Only the category
/// ever reaches the wire.
pub struct Error {
  error_type: types::Error,
  report: Option<Report<Opaque>>,
  trace: SpanTrace,
}

impl Error {
  #[must_use]
  pub fn new(error_type: types::Error) -> Self {
    Self {
      error_type,
      report: None,
      trace: SpanTrace::capture(),
    }
  }

  #[must_use]
  pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
    Self {
      error_type,
      report: Some(Report::new(context).change_context(Opaque)),
      trace: SpanTrace::capture(),
    }
  }

  #[must_use]
  pub fn from_report(error_type: types::Error, report: Report<impl Context>) -> Self {
    Self {
      error_type,
      report: Some(report.change_context(Opaque)),
      trace: SpanTrace::capture(),
    }
  }
}

impl Error {
  #[must_use]
  pub fn as_type(&self) -> &types::Error {
    &self.error_type
  }

  #[must_use]
  pub fn change_type(mut self, error_type: types::Error) -> Self {
    self.error_type = error_type;
    self
  }

  #[must_use]
  pub fn downcast_ref<F: Context>(&self) -> Option<&F> {
    self.report.as_ref().and_then(|v| v.downcast_ref::<F>())
  }
}

impl std::fmt::Debug for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Error")
      .field("type", &self.error_type)
      .field("report", &self.report)
      .field("trace", &self.trace)
      .finish()
  }
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: ", &self.error_type)?;
    writeln!(f, "{:?}", self.report)?;
    std::fmt::Display::fmt(&self.trace, f)
  }
}
