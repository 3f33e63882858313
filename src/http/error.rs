use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use log::error;
use thiserror::Error;

use super::dto::ErrorResponse;
use crate::service::ServiceError;

/// Errors returned by the API, each one mapped to an HTTP status.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
  #[error("Invalid API Key")]
  InvalidApiKey,

  #[error("Invalid request: {0}")]
  Validation(String),

  #[error(transparent)]
  Service(#[from] ServiceError),
}

impl ApiError {
  fn status_and_detail(&self) -> (StatusCode, String) {
    match self {
      ApiError::InvalidApiKey => (StatusCode::FORBIDDEN, "Invalid API Key".to_string()),
      ApiError::Validation(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
      ApiError::Service(ServiceError::DuplicatedTransaction(_)) => (
        StatusCode::BAD_REQUEST,
        "Transaction ID already exists".to_string(),
      ),
      ApiError::Service(ServiceError::StoreUnavailable(_)) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Store unavailable".to_string(),
      ),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, detail) = self.status_and_detail();
    if status.is_server_error() {
      error!("{}", self);
    }
    (status, Json(ErrorResponse::new(detail))).into_response()
  }
}
