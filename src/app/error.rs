use actix_web::{
  error::ResponseError,
  HttpResponse
};
use derive_more::Display;
use log::error;
use crate::blog::BlogError;
use crate::contact::ContactError;

// The inner messages don't go out to random internet people,
// they're only there for the logs. Except for BadRequest and
// NotFound where they're actually useful to the frontend.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal Server Error")]
  InternalServerError(String),
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Unauthorized: {}", _0)]
  Unauthorized(String),
  #[display(fmt = "Forbidden: {}", _0)]
  Forbidden(String),
  #[display(fmt = "Not Found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Bad Request: {}", _0)]
  BadRequest(String),
  #[display(fmt = "Too many requests")]
  TooManyRequests
}

// Plain text error bodies, the frontend just shows them.
impl ResponseError for Error {
  fn error_response(&self) -> HttpResponse {
    match self {
      Error::InternalServerError(_) | Error::DatabaseError(_) =>
        HttpResponse::InternalServerError().body(self.to_string()),
      Error::Unauthorized(_) => HttpResponse::Unauthorized().body(self.to_string()),
      Error::Forbidden(_) => HttpResponse::Forbidden().body(self.to_string()),
      Error::NotFound(_) => HttpResponse::NotFound().body(self.to_string()),
      Error::BadRequest(_) => HttpResponse::BadRequest().body(self.to_string()),
      Error::TooManyRequests => HttpResponse::TooManyRequests().body(self.to_string())
    }
  }
}

// The repository already logged store failures.
impl From<BlogError> for Error {
  fn from(error: BlogError) -> Self {
    match error {
      BlogError::AuthRequired => Error::Unauthorized(error.to_string()),
      BlogError::NotFound(_) => Error::NotFound(error.to_string()),
      BlogError::Store(e) => Error::DatabaseError(e.to_string())
    }
  }
}

impl From<ContactError> for Error {
  fn from(error: ContactError) -> Self {
    match error {
      ContactError::Invalid(msg) => Error::BadRequest(msg),
      ContactError::Relay(msg) => {
        error!("Contact relay error - {}", msg);
        Error::InternalServerError(msg)
      }
    }
  }
}
