use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the AI-backed endpoints.
///
/// Every variant is rendered as a JSON body with an `error` field. Nothing is
/// retried; the handler returns the first failure it hits.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The request body was not declared as JSON.
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    /// The completion service could not be reached or answered with an error.
    #[error("{message}")]
    Upstream {
        message: String,
        detail: Option<String>,
    },

    /// The completion service answered, but no JSON object could be recovered.
    #[error("{message}")]
    MalformedAiResponse { message: String, raw: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_response: Option<&'a str>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            detail,
        }
    }

    pub fn malformed(raw: impl Into<String>) -> Self {
        Self::MalformedAiResponse {
            message: "Failed to parse AI response".to_string(),
            raw: raw.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Upstream { .. } | Self::MalformedAiResponse { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match &self {
            Self::Validation(_) | Self::UnsupportedMediaType => ErrorResponse {
                error: &message,
                details: None,
                raw_response: None,
            },
            Self::Upstream { detail, .. } => ErrorResponse {
                error: &message,
                details: detail.as_deref(),
                raw_response: None,
            },
            Self::MalformedAiResponse { raw, .. } => ErrorResponse {
                error: &message,
                details: None,
                raw_response: Some(raw),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let (status, body) = body_json(ApiError::validation("At least one item is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one item is required");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn media_type_maps_to_415() {
        let (status, body) = body_json(ApiError::UnsupportedMediaType).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].as_str().unwrap().contains("application/json"));
    }

    #[tokio::test]
    async fn upstream_includes_detail() {
        let err = ApiError::upstream("Failed to get shelf life", Some("429 rate limited".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to get shelf life");
        assert_eq!(body["details"], "429 rate limited");
    }

    #[tokio::test]
    async fn malformed_includes_raw_text() {
        let (status, body) = body_json(ApiError::malformed("no json here")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["rawResponse"], "no json here");
    }
}
