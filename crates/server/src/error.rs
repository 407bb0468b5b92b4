use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Why a mutation could not find its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    /// The supplied `_id` is not a well-formed identifier.
    InvalidId,
    /// Well-formed, but no issue with that id exists in the project.
    NotFound,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("required field(s) missing")]
    MissingRequiredFields,
    #[error("missing _id")]
    MissingId,
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },
    #[error("could not update")]
    CouldNotUpdate { id: String, reason: LookupFailure },
    #[error("could not delete")]
    CouldNotDelete { id: String, reason: LookupFailure },
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingRequiredFields
            | ApiError::MissingId
            | ApiError::NoUpdateFields { .. }
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CouldNotUpdate { reason, .. } | ApiError::CouldNotDelete { reason, .. } => {
                match reason {
                    LookupFailure::InvalidId => StatusCode::BAD_REQUEST,
                    LookupFailure::NotFound => StatusCode::NOT_FOUND,
                }
            }
        }
    }

    fn echoed_id(&self) -> Option<&str> {
        match self {
            ApiError::NoUpdateFields { id }
            | ApiError::CouldNotUpdate { id, .. }
            | ApiError::CouldNotDelete { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status();

        let error_message = if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error = %self,
                "API request failed"
            );
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: error_message,
            id: self.echoed_id(),
        };
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::MissingRequiredFields.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NoUpdateFields { id: "x".into() }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::CouldNotUpdate {
                id: "x".into(),
                reason: LookupFailure::InvalidId
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::CouldNotDelete {
                id: "x".into(),
                reason: LookupFailure::NotFound
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn mutation_errors_echo_the_raw_id() {
        let (status, body) = body_json(ApiError::CouldNotUpdate {
            id: "abc".into(),
            reason: LookupFailure::InvalidId,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "could not update", "_id": "abc" }));

        let (_, body) = body_json(ApiError::MissingId).await;
        assert_eq!(body, json!({ "error": "missing _id" }));
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body) = body_json(ApiError::Database(DbErr::Custom(
            "disk I/O error at /var/lib".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }
}
