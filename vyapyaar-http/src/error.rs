use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vyapyaar_common::ScrapeError;

/// Request-level failures. Extraction failures are not here: they travel
/// inside a `200` [`ScrapeOutcome`](vyapyaar_common::ScrapeOutcome).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Missing product name")]
    MissingProductName,

    #[error("Service is shutting down")]
    ShuttingDown,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingProductName => StatusCode::BAD_REQUEST,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ScrapeError::new(self.to_string()));
        (self.status(), body).into_response()
    }
}
