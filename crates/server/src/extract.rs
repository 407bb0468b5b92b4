use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Request body accepted as either `application/json` or
/// `application/x-www-form-urlencoded`. An empty body deserializes as `{}`.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

fn body_kind(content_type: Option<&str>) -> Option<BodyKind> {
    let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    if mime == "application/json" || mime.ends_with("+json") {
        Some(BodyKind::Json)
    } else if mime == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else {
        None
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let parsed: Result<T, serde_path_to_error::Error<serde_json::Error>> =
        serde_path_to_error::deserialize(&mut deserializer);
    match parsed {
        Ok(value) => Ok(value),
        Err(err) => {
            let path = err.path().to_string();
            let inner = err.into_inner();
            if path == "." {
                Err(ApiError::BadRequest(format!("invalid JSON body: {inner}")))
            } else {
                Err(ApiError::BadRequest(format!(
                    "invalid JSON body at {path}: {inner}"
                )))
            }
        }
    }
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(
            req.headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return parse_json(b"{}").map(JsonOrForm);
        }

        match kind {
            Some(BodyKind::Json) => parse_json(&bytes).map(JsonOrForm),
            Some(BodyKind::Form) => serde_urlencoded::from_bytes(&bytes)
                .map(JsonOrForm)
                .map_err(|err| ApiError::BadRequest(format!("invalid form body: {err}"))),
            None => Err(ApiError::BadRequest(
                "expected an application/json or application/x-www-form-urlencoded body"
                    .to_string(),
            )),
        }
    }
}
