//! HTTP edge of the error taxonomy
//!
//! `AppError` becomes the `{"status": false, ...}` envelope here and nowhere
//! else. `ApiJson` and `ApiQuery` turn malformed bodies and query strings into
//! the same 422 shape.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(errors) => json!({
                "status": false,
                "message": errors.first_message().unwrap_or("The given data was invalid."),
                "errors": errors,
            }),
            AppError::Unauthenticated => json!({
                "status": false,
                "message": "Unauthenticated.",
            }),
            AppError::InvalidCredentials => json!({
                "status": false,
                "message": "Invalid credentials",
            }),
            AppError::Forbidden(message) | AppError::NotFound(message) => json!({
                "status": false,
                "message": message,
            }),
            AppError::Store(err) => {
                error!("Request failed: {:#}", err);
                json!({
                    "status": false,
                    "error": "Internal server error",
                    "details": err.to_string(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// `Json<T>` whose rejection is a 422 on the `body` field
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::validation("body", rejection.body_text())),
        }
    }
}

/// `Query<T>` whose rejection is a 422 on the `query` field
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(AppError::validation("query", rejection.body_text())),
        }
    }
}

/// Path ids that are not integers name nothing, so they are a 404
pub fn parse_id(raw: &str, not_found: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::not_found(not_found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use serde::Deserialize;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let response = AppError::validation("assigned_to", "Assigned user must be an employee")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Assigned user must be an employee");
        assert_eq!(body["errors"]["assigned_to"][0], "Assigned user must be an employee");

        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid credentials");

        let response = AppError::forbidden("Forbidden. Admins only.").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AppError::not_found("Ticket not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Ticket not found");

        let response = AppError::Store(anyhow::anyhow!("disk I/O error")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["details"], "disk I/O error");
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        value: i64,
    }

    #[tokio::test]
    async fn test_api_json_rejection_is_validation() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        match ApiJson::<Sample>::from_request(req, &()).await {
            Err(AppError::Validation(errors)) => assert!(errors.has("body")),
            other => panic!("expected validation error, got {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_api_query_rejection_is_validation() {
        let (mut parts, _) = Request::builder()
            .uri("/api/tickets?value=abc")
            .body(())
            .unwrap()
            .into_parts();

        match ApiQuery::<Sample>::from_request_parts(&mut parts, &()).await {
            Err(AppError::Validation(errors)) => assert!(errors.has("query")),
            other => panic!("expected validation error, got {:?}", other.map(|q| q.0)),
        }

        let (mut parts, _) = Request::builder()
            .uri("/api/tickets?value=7")
            .body(())
            .unwrap()
            .into_parts();
        let ApiQuery(sample) = ApiQuery::<Sample>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(sample.value, 7);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "missing").unwrap(), 42);
        assert!(matches!(parse_id("abc", "missing"), Err(AppError::NotFound(_))));
    }
}
