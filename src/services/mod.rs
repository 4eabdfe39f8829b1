//! Business logic services

pub mod authors;
pub mod books;
pub mod borrow_records;
pub mod patrons;

use crate::{config::LibraryConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
    pub authors: authors::AuthorService,
    pub patrons: patrons::PatronService,
    pub borrow_records: borrow_records::BorrowRecordService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, library: &LibraryConfig) -> Self {
        let books = books::BookService::new(repository.clone());
        Self {
            authors: authors::AuthorService::new(repository.clone(), books.clone()),
            patrons: patrons::PatronService::new(repository.clone()),
            borrow_records: borrow_records::BorrowRecordService::new(
                repository.clone(),
                books.clone(),
                library.loan_period_days,
            ),
            books,
            repository,
        }
    }

    /// Whether the database answers
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
