//! Patron endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        patron::{CreatePatron, UpdatePatron},
        BookDto, PageQuery, PagedResult, PatronDto,
    },
    AppState,
};

use super::{ApiPath, ApiQuery, RequestToken, ValidatedJson};

/// List patrons ordered by name
#[utoipa::path(
    get,
    path = "/patrons",
    tag = "patrons",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of patrons", body = crate::models::pagination::PagedPatrons)
    )
)]
pub async fn list_patrons(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PagedResult<PatronDto>>> {
    let pagination = query.resolve(&state.config.library);
    let patrons = state.services.patrons.list(&token, pagination).await?;
    Ok(Json(patrons))
}

/// Get patron by ID
#[utoipa::path(
    get,
    path = "/patrons/{id}",
    tag = "patrons",
    params(("id" = i32, Path, description = "Patron ID")),
    responses(
        (status = 200, description = "Patron details", body = PatronDto),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_patron(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<PatronDto>> {
    let patron = state.services.patrons.get(&token, id).await?;
    Ok(Json(patron))
}

/// Books the patron currently has out
#[utoipa::path(
    get,
    path = "/patrons/{id}/books",
    tag = "patrons",
    params(("id" = i32, Path, description = "Patron ID")),
    responses(
        (status = 200, description = "Borrowed books", body = Vec<BookDto>),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_patron_books(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.services.patrons.borrowed_books(&token, id).await?;
    Ok(Json(books))
}

/// Register a patron
#[utoipa::path(
    post,
    path = "/patrons",
    tag = "patrons",
    request_body = CreatePatron,
    responses(
        (status = 201, description = "Patron registered", body = PatronDto),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_patron(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ValidatedJson(data): ValidatedJson<CreatePatron>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<PatronDto>)> {
    let patron = state.services.patrons.create(&token, data).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/patrons/{}", patron.id))],
        Json(patron),
    ))
}

/// Replace a patron's fields
#[utoipa::path(
    put,
    path = "/patrons/{id}",
    tag = "patrons",
    params(("id" = i32, Path, description = "Patron ID")),
    request_body = UpdatePatron,
    responses(
        (status = 204, description = "Patron updated"),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_patron(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdatePatron>,
) -> AppResult<StatusCode> {
    state.services.patrons.update(&token, id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a patron without borrow history
#[utoipa::path(
    delete,
    path = "/patrons/{id}",
    tag = "patrons",
    params(("id" = i32, Path, description = "Patron ID")),
    responses(
        (status = 204, description = "Patron deleted"),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Patron has borrow records", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_patron(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.patrons.delete(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
