//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrow_records, health, patrons};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Library management REST API: catalog, members and lending",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::get_availability,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::search_authors,
        authors::get_author,
        authors::get_author_books,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Patrons
        patrons::list_patrons,
        patrons::get_patron,
        patrons::get_patron_books,
        patrons::create_patron,
        patrons::update_patron,
        patrons::delete_patron,
        // Borrow records
        borrow_records::list_borrow_records,
        borrow_records::list_overdue,
        borrow_records::get_borrow_record,
        borrow_records::check_out,
        borrow_records::return_book,
    ),
    components(
        schemas(
            // Books
            crate::models::BookDto,
            crate::models::BookAvailability,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::pagination::PagedBooks,
            // Authors
            crate::models::AuthorDto,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::pagination::PagedAuthors,
            // Patrons
            crate::models::PatronDto,
            crate::models::patron::CreatePatron,
            crate::models::patron::UpdatePatron,
            crate::models::pagination::PagedPatrons,
            // Borrow records
            crate::models::BorrowRecordDto,
            crate::models::BorrowStatus,
            crate::models::borrow_record::CreateBorrowRecord,
            crate::models::pagination::PagedBorrowRecords,
            // Shared
            super::CreatedResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Author management"),
        (name = "patrons", description = "Library members"),
        (name = "borrow-records", description = "Checkout and return")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_checkout_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/borrow-records"));
        assert!(doc.paths.paths.contains_key("/borrow-records/{id}/return"));
        assert!(doc.paths.paths.contains_key("/books/{id}/availability"));
    }

    #[test]
    fn test_paged_responses_reference_aliases() {
        let json = ApiDoc::openapi().to_json().unwrap();
        for alias in ["PagedBooks", "PagedAuthors", "PagedPatrons", "PagedBorrowRecords"] {
            assert!(json.contains(&format!("#/components/schemas/{}", alias)), "{} not referenced", alias);
        }
    }
}
