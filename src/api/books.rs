//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, response::Response, Json};

use crate::{
    error::AppResult,
    models::{
        book::{BookSearchQuery, CreateBook, UpdateBook},
        BookAvailability, BookDto, PageQuery, PagedResult,
    },
    AppState,
};

use super::{created, ApiPath, ApiQuery, RequestToken, ValidatedJson};

/// List books ordered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = crate::models::pagination::PagedBooks)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PagedResult<BookDto>>> {
    let pagination = query.resolve(&state.config.library);
    let books = state.services.books.list(&token, pagination).await?;
    Ok(Json(books))
}

/// Search books by title and/or author name
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Matching books", body = crate::models::pagination::PagedBooks),
        (status = 400, description = "Neither title nor author given", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(query): ApiQuery<BookSearchQuery>,
) -> AppResult<Json<PagedResult<BookDto>>> {
    let pagination = query.page_query().resolve(&state.config.library);
    let books = state
        .services
        .books
        .search(&token, query.title, query.author, pagination)
        .await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDto),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookDto>> {
    let book = state.services.books.get(&token, id).await?;
    Ok(Json(book))
}

/// Copies currently available for checkout
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Availability", body = BookAvailability),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookAvailability>> {
    let availability = state.services.books.availability(&token, id).await?;
    Ok(Json(availability))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = super::CreatedResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ValidatedJson(data): ValidatedJson<CreateBook>,
) -> AppResult<Response> {
    let id = state.services.books.create(&token, data).await?;
    Ok(created(format!("/api/books/{}", id), id))
}

/// Replace a book's fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateBook>,
) -> AppResult<StatusCode> {
    state.services.books.update(&token, id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book has borrow records", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
