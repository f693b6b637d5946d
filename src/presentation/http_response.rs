// HTTP response utilities - error mapping shared by every handler
use crate::domain::error::TrackerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_configured(feature: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{feature} is not configured"),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        let status = match &err {
            TrackerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TrackerError::NoDataInWindow { .. } => StatusCode::NOT_FOUND,
            TrackerError::FetchFailed { .. }
            | TrackerError::MissingColumn { .. }
            | TrackerError::SendFailed { .. } => StatusCode::BAD_GATEWAY,
            TrackerError::FileIoFailed { .. } | TrackerError::RenderFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("{}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Plain-text body, used for the report-style endpoints
pub fn text_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid: ApiError = TrackerError::InvalidInput("Please enter a filter value.".to_string()).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let send: ApiError = TrackerError::SendFailed {
            target: "+1".to_string(),
            cause: "404".to_string(),
        }
        .into();
        assert_eq!(send.status, StatusCode::BAD_GATEWAY);

        let io: ApiError = TrackerError::FileIoFailed {
            path: "a.csv".to_string(),
            cause: "denied".to_string(),
        }
        .into();
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::not_configured("Phone lookup").status, StatusCode::NOT_FOUND);
    }
}
