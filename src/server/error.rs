use crate::core::{CurrencyError, RateError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Rates(#[from] RateError),
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::Unsupported(code) => ApiError::UnsupportedCurrency(code),
            CurrencyError::Empty => ApiError::UnsupportedCurrency(String::new()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnsupportedCurrency(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Rates(e) => {
                error!(error = %e, "Rate source failed while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
