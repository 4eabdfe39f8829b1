//! Checkout, return and borrow record endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        borrow_record::{BorrowRecordFilter, CreateBorrowRecord},
        BorrowRecordDto, PagedResult,
    },
    AppState,
};

use super::{ApiPath, ApiQuery, RequestToken, ValidatedJson};

/// List borrow records, newest first
#[utoipa::path(
    get,
    path = "/borrow-records",
    tag = "borrow-records",
    params(BorrowRecordFilter),
    responses(
        (status = 200, description = "Page of borrow records", body = crate::models::pagination::PagedBorrowRecords)
    )
)]
pub async fn list_borrow_records(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiQuery(filter): ApiQuery<BorrowRecordFilter>,
) -> AppResult<Json<PagedResult<BorrowRecordDto>>> {
    let pagination = filter.page_query().resolve(&state.config.library);
    let records = state
        .services
        .borrow_records
        .list(&token, &filter, pagination)
        .await?;
    Ok(Json(records))
}

/// Active records past their due date
#[utoipa::path(
    get,
    path = "/borrow-records/overdue",
    tag = "borrow-records",
    responses(
        (status = 200, description = "Overdue records", body = Vec<BorrowRecordDto>)
    )
)]
pub async fn list_overdue(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
) -> AppResult<Json<Vec<BorrowRecordDto>>> {
    let records = state.services.borrow_records.overdue(&token).await?;
    Ok(Json(records))
}

/// Get borrow record by ID
#[utoipa::path(
    get,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Borrow record", body = BorrowRecordDto),
        (status = 404, description = "Borrow record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrow_record(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BorrowRecordDto>> {
    let record = state.services.borrow_records.get(&token, id).await?;
    Ok(Json(record))
}

/// Check a book out to a patron
#[utoipa::path(
    post,
    path = "/borrow-records",
    tag = "borrow-records",
    request_body = CreateBorrowRecord,
    responses(
        (status = 201, description = "Book checked out", body = BorrowRecordDto),
        (status = 400, description = "Book unavailable or invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_out(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ValidatedJson(data): ValidatedJson<CreateBorrowRecord>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<BorrowRecordDto>)> {
    let record = state.services.borrow_records.check_out(&token, data).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/borrow-records/{}", record.id))],
        Json(record),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/borrow-records/{id}/return",
    tag = "borrow-records",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 204, description = "Book returned"),
        (status = 404, description = "No active record with this ID", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.borrow_records.return_book(&token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
