//! Author endpoints

use axum::{extract::State, http::StatusCode, response::Response, Json};

use crate::{
    error::AppResult,
    models::{
        author::{AuthorSearchQuery, CreateAuthor, UpdateAuthor},
        AuthorDto, BookDto, PageQuery, PagedResult,
    },
    AppState,
};

use super::{created, ApiPath, ApiQuery, RequestToken, ValidatedJson};

/// List authors ordered by last name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = crate::models::pagination::PagedAuthors)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PagedResult<AuthorDto>>> {
    let pagination = query.resolve(&state.config.library);
    let authors = state.services.authors.list(&token, pagination).await?;
    Ok(Json(authors))
}

/// Search authors by first or last name
#[utoipa::path(
    get,
    path = "/authors/search",
    tag = "authors",
    params(AuthorSearchQuery),
    responses(
        (status = 200, description = "Matching authors", body = crate::models::pagination::PagedAuthors)
    )
)]
pub async fn search_authors(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(query): ApiQuery<AuthorSearchQuery>,
) -> AppResult<Json<PagedResult<AuthorDto>>> {
    let pagination = query.page_query().resolve(&state.config.library);
    let authors = state
        .services
        .authors
        .search(&token, query.query.as_deref(), pagination)
        .await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDto),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<AuthorDto>> {
    let author = state.services.authors.get(&token, id).await?;
    Ok(Json(author))
}

/// Books written by an author
#[utoipa::path(
    get,
    path = "/authors/{id}/books",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID"), PageQuery),
    responses(
        (status = 200, description = "Author's books", body = crate::models::pagination::PagedBooks),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author_books(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PagedResult<BookDto>>> {
    let pagination = query.resolve(&state.config.library);
    let books = state.services.authors.books(&token, id, pagination).await?;
    Ok(Json(books))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = super::CreatedResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ValidatedJson(data): ValidatedJson<CreateAuthor>,
) -> AppResult<Response> {
    let id = state.services.authors.create(&token, data).await?;
    Ok(created(format!("/api/authors/{}", id), id))
}

/// Replace an author's fields
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 204, description = "Author updated"),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateAuthor>,
) -> AppResult<StatusCode> {
    state.services.authors.update(&token, id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.authors.delete(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
