//! Data models for the library server

pub mod author;
pub mod book;
pub mod borrow_record;
pub mod pagination;
pub mod patron;

// Re-export commonly used types
pub use author::{Author, AuthorDto};
pub use book::{Book, BookAvailability, BookDto};
pub use borrow_record::{BorrowRecord, BorrowRecordDto, BorrowStatus};
pub use pagination::{PageQuery, PagedResult, Pagination};
pub use patron::{Patron, PatronDto};
