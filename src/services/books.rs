//! Book catalog service: listing, search, availability and CRUD

use sqlx::PgConnection;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookFilter, CreateBook, UpdateBook},
        Book, BookAvailability, BookDto, PagedResult, Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books, ordered by title
    pub async fn list(
        &self,
        token: &CancellationToken,
        pagination: Pagination,
    ) -> AppResult<PagedResult<BookDto>> {
        self.find(token, &BookFilter::default(), pagination).await
    }

    /// Title and/or author substring search; at least one term is required
    pub async fn search(
        &self,
        token: &CancellationToken,
        title: Option<String>,
        author: Option<String>,
        pagination: Pagination,
    ) -> AppResult<PagedResult<BookDto>> {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&title) && blank(&author) {
            return Err(AppError::Validation(
                "At least one search parameter title or author is required".to_string(),
            ));
        }

        let filter = BookFilter {
            title,
            author,
            author_id: None,
        };
        self.find(token, &filter, pagination).await
    }

    pub async fn find(
        &self,
        token: &CancellationToken,
        filter: &BookFilter,
        pagination: Pagination,
    ) -> AppResult<PagedResult<BookDto>> {
        let (rows, total) = self.repository.books.search(token, filter, pagination).await?;
        Ok(PagedResult::new(rows, pagination, total).map(BookDto::from))
    }

    pub async fn get(&self, token: &CancellationToken, id: i32) -> AppResult<BookDto> {
        self.repository
            .books
            .get_details(token, id)
            .await?
            .map(BookDto::from)
            .ok_or_else(|| AppError::not_found("Book", id))
    }

    pub async fn availability(&self, token: &CancellationToken, id: i32) -> AppResult<BookAvailability> {
        self.repository
            .books
            .availability(token, id)
            .await?
            .ok_or_else(|| AppError::not_found("Book", id))
    }

    /// Lock the book row inside the caller's transaction and require a free copy
    pub async fn reserve(&self, conn: &mut PgConnection, id: i32) -> AppResult<BookAvailability> {
        match self.repository.books.availability_in(conn, id, true).await? {
            Some(availability) if availability.is_available => Ok(availability),
            Some(_) => Err(AppError::BookUnavailable(format!(
                "Book with ID {} is not available for borrowing.",
                id
            ))),
            None => Err(AppError::BookUnavailable(format!(
                "Book with ID {} does not exist.",
                id
            ))),
        }
    }

    /// Create a book, returning its id
    pub async fn create(&self, token: &CancellationToken, data: CreateBook) -> AppResult<i32> {
        self.require_author(token, data.author_id).await?;

        let mut book = Book::from(data);
        self.repository.books.base().add(token, &mut book).await?;
        tracing::info!("Created book {} ({})", book.id, book.isbn);
        Ok(book.id)
    }

    pub async fn update(&self, token: &CancellationToken, id: i32, data: UpdateBook) -> AppResult<()> {
        let mut book = self.repository.books.base().get_required(token, id).await?;
        if data.author_id != book.author_id {
            self.require_author(token, data.author_id).await?;
        }

        book.apply(data);
        self.repository.books.base().update(token, &book).await
    }

    pub async fn delete(&self, token: &CancellationToken, id: i32) -> AppResult<()> {
        let base = self.repository.books.base();
        if !base.exists_by_id(token, id).await? {
            return Err(AppError::not_found("Book", id));
        }
        base.remove_by_id(token, id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    async fn require_author(&self, token: &CancellationToken, author_id: i32) -> AppResult<()> {
        if !self.repository.authors.base().exists_by_id(token, author_id).await? {
            return Err(AppError::not_found("Author", author_id));
        }
        Ok(())
    }
}
