//! API handlers for the library REST endpoints

pub mod authors;
pub mod books;
pub mod borrow_records;
pub mod health;
pub mod openapi;
pub mod patrons;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppError, AppState};

/// Cancellation token of the current request.
///
/// Cancelled when the client goes away (the request future is dropped) or
/// when the server shuts down.
#[derive(Clone)]
pub struct RequestToken(pub CancellationToken);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestToken>()
            .cloned()
            .unwrap_or_else(|| RequestToken(CancellationToken::new())))
    }
}

/// Middleware giving every request a child of the shutdown token
pub async fn request_cancellation(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = state.shutdown.child_token();
    let _guard = token.clone().drop_guard();
    request.extensions_mut().insert(RequestToken(token));
    next.run(request).await
}

/// JSON body that is deserialized, then checked with `validator`
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string extractor with the API's error body on rejection
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::BadRequest(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Path extractor with the API's error body on rejection
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| AppError::BadRequest(e.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// Body of a `201 Created` response
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

/// `201 Created` with a `Location` header pointing at the new resource
pub fn created(location: String, id: i32) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedResponse { id }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_response() {
        let response = created("/api/books/7".to_string(), 7);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/api/books/7")
        );
    }
}
