use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response::ApiResponse;
use crate::ledger::LedgerError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    MethodNotAllowed(String),
    InternalError(String),
    /// The spreadsheet store failed; the detail is passed through to the caller.
    UpstreamError(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::MethodNotAllowed(msg) => msg.clone(),
            ApiError::InternalError(msg) => msg.clone(),
            ApiError::UpstreamError(_) => "An internal server error occurred.".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::UpstreamError(detail) => Some(detail.clone()),
            _ => None,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::MissingField(_) | LedgerError::InvalidField { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            LedgerError::SheetNotFound(_) | LedgerError::RowNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            LedgerError::RowChanged { .. } => ApiError::Conflict(err.to_string()),
            LedgerError::Upstream(store_err) => {
                tracing::error!("spreadsheet store failure: {}", store_err);
                ApiError::UpstreamError(store_err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ApiResponse::<serde_json::Value>::error(self.message(), self.detail());

        (status, Json(error_response)).into_response()
    }
}
