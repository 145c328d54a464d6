//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Error bodies follow the JSON:API error-object convention used by the
//! legacy surface: `{"errors": {"status": ..., "title": ...}}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Core(#[from] orgdir_core::Error),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use orgdir_core::Error as Core;
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Core(Core::InvalidArgument(_) | Core::InvalidSetting(_)) => {
        StatusCode::BAD_REQUEST
      }
      // Backend trouble of any kind is the upstream's fault from the
      // caller's point of view.
      ApiError::Core(
        Core::BackendUnavailable { .. }
        | Core::BackendRejected { .. }
        | Core::AssemblyGap { .. },
      ) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = json!({
      "errors": {
        "status": status.as_u16(),
        "title": self.to_string(),
      }
    });
    (status, Json(body)).into_response()
  }
}
