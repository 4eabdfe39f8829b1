//! Book model, availability arithmetic and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::pagination::PageQuery;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub quantity: i32,
    pub author_id: i32,
}

impl Book {
    pub fn apply(&mut self, data: UpdateBook) {
        self.title = data.title;
        self.isbn = data.isbn;
        self.publication_year = data.publication_year;
        self.description = data.description;
        self.cover_image_url = data.cover_image_url;
        self.quantity = data.quantity;
        self.author_id = data.author_id;
    }
}

impl From<CreateBook> for Book {
    fn from(data: CreateBook) -> Self {
        Self {
            id: 0,
            title: data.title,
            isbn: data.isbn,
            publication_year: data.publication_year,
            description: data.description,
            cover_image_url: data.cover_image_url,
            quantity: data.quantity,
            author_id: data.author_id,
        }
    }
}

/// Copies on the shelf: quantity minus active borrows, never below zero
pub fn available_copies(quantity: i32, active_borrows: i64) -> i32 {
    let available = (i64::from(quantity) - active_borrows).max(0);
    i32::try_from(available).unwrap_or(i32::MAX)
}

/// Book joined with its author and active borrow count
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    #[sqlx(flatten)]
    pub book: Book,
    pub author_first_name: String,
    pub author_last_name: String,
    pub active_borrows: i64,
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl From<BookRow> for BookDto {
    fn from(row: BookRow) -> Self {
        let available = available_copies(row.book.quantity, row.active_borrows);
        Self {
            id: row.book.id,
            title: row.book.title,
            isbn: row.book.isbn,
            publication_year: row.book.publication_year,
            description: row.book.description,
            cover_image_url: row.book.cover_image_url,
            author_id: row.book.author_id,
            author_name: Some(format!("{} {}", row.author_first_name, row.author_last_name)),
            total_copies: row.book.quantity,
            available_copies: available,
        }
    }
}

/// Availability of one book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAvailability {
    pub book_id: i32,
    pub available_copies: i32,
    pub is_available: bool,
}

impl BookAvailability {
    pub fn new(book_id: i32, quantity: i32, active_borrows: i64) -> Self {
        let available = available_copies(quantity, active_borrows);
        Self {
            book_id,
            available_copies: available,
            is_available: available > 0,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    #[validate(length(min = 1, max = 20, message = "ISBN is required (max 20 characters)"))]
    pub isbn: String,
    #[validate(range(min = 0, max = 9999, message = "Publication year is out of range"))]
    pub publication_year: i32,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "Cover image URL must be at most 500 characters"))]
    pub cover_image_url: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 1, message = "Author id is required"))]
    pub author_id: i32,
}

/// Update book request (full replacement)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    #[validate(length(min = 1, max = 20, message = "ISBN is required (max 20 characters)"))]
    pub isbn: String,
    #[validate(range(min = 0, max = 9999, message = "Publication year is out of range"))]
    pub publication_year: i32,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "Cover image URL must be at most 500 characters"))]
    pub cover_image_url: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 1, message = "Author id is required"))]
    pub author_id: i32,
}

/// Book search query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookSearchQuery {
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the author's first or last name
    pub author: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl BookSearchQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Filters applied to book listings
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(quantity: i32, active: i64) -> BookRow {
        BookRow {
            book: Book {
                id: 1,
                title: "1984".to_string(),
                isbn: "9780451524935".to_string(),
                publication_year: 1949,
                description: None,
                cover_image_url: None,
                quantity,
                author_id: 1,
            },
            author_first_name: "George".to_string(),
            author_last_name: "Orwell".to_string(),
            active_borrows: active,
        }
    }

    #[test]
    fn test_available_copies() {
        assert_eq!(available_copies(5, 0), 5);
        assert_eq!(available_copies(5, 2), 3);
        assert_eq!(available_copies(5, 5), 0);
    }

    #[test]
    fn test_available_copies_floors_at_zero() {
        // quantity lowered below the number of copies out
        assert_eq!(available_copies(2, 3), 0);
        assert_eq!(available_copies(0, 0), 0);
    }

    #[test]
    fn test_availability_after_return() {
        let exhausted = BookAvailability::new(1, 5, 5);
        assert_eq!(exhausted.available_copies, 0);
        assert!(!exhausted.is_available);

        let after_return = BookAvailability::new(1, 5, 4);
        assert_eq!(after_return.available_copies, 1);
        assert!(after_return.is_available);
    }

    #[test]
    fn test_dto_from_row() {
        let dto = BookDto::from(row(3, 1));
        assert_eq!(dto.author_name.as_deref(), Some("George Orwell"));
        assert_eq!(dto.total_copies, 3);
        assert_eq!(dto.available_copies, 2);
    }

    #[test]
    fn test_create_book_validation() {
        let data = CreateBook {
            title: "1984".to_string(),
            isbn: "9780451524935".to_string(),
            publication_year: 1949,
            description: None,
            cover_image_url: Some("x".repeat(501)),
            quantity: -1,
            author_id: 1,
        };
        let errors = data.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cover_image_url"));
        assert!(fields.contains_key("quantity"));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn test_relative_cover_path_accepted() {
        let data = UpdateBook {
            title: "1984".to_string(),
            isbn: "9780451524935".to_string(),
            publication_year: 1949,
            description: None,
            cover_image_url: Some("/images/covers/1984.jpg".to_string()),
            quantity: 5,
            author_id: 1,
        };
        assert!(data.validate().is_ok());
    }
}
