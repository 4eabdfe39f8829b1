//! Author management service

use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::BookFilter,
        Author, AuthorDto, BookDto, PagedResult, Pagination,
    },
    repository::Repository,
};

use super::books::BookService;

#[derive(Clone)]
pub struct AuthorService {
    repository: Repository,
    books: BookService,
}

impl AuthorService {
    pub fn new(repository: Repository, books: BookService) -> Self {
        Self { repository, books }
    }

    /// Authors ordered by last name
    pub async fn list(
        &self,
        token: &CancellationToken,
        pagination: Pagination,
    ) -> AppResult<PagedResult<AuthorDto>> {
        self.search(token, None, pagination).await
    }

    /// Authors whose first or last name contains `query`
    pub async fn search(
        &self,
        token: &CancellationToken,
        query: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<PagedResult<AuthorDto>> {
        let (authors, total) = self.repository.authors.page(token, query, pagination).await?;
        Ok(PagedResult::new(authors, pagination, total).map(AuthorDto::from))
    }

    pub async fn get(&self, token: &CancellationToken, id: i32) -> AppResult<AuthorDto> {
        let author = self.repository.authors.base().get_required(token, id).await?;
        Ok(author.into())
    }

    pub async fn create(&self, token: &CancellationToken, data: CreateAuthor) -> AppResult<i32> {
        let mut author = Author::from(data);
        self.repository.authors.base().add(token, &mut author).await?;
        tracing::info!("Created author {} ({})", author.id, author.full_name());
        Ok(author.id)
    }

    pub async fn update(&self, token: &CancellationToken, id: i32, data: UpdateAuthor) -> AppResult<()> {
        let mut author = self.repository.authors.base().get_required(token, id).await?;
        author.apply(data);
        self.repository.authors.base().update(token, &author).await
    }

    /// Fails with a conflict while the author still has books
    pub async fn delete(&self, token: &CancellationToken, id: i32) -> AppResult<()> {
        let base = self.repository.authors.base();
        if !base.exists_by_id(token, id).await? {
            return Err(AppError::not_found("Author", id));
        }
        base.remove_by_id(token, id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    /// Books written by the author, ordered by title
    pub async fn books(
        &self,
        token: &CancellationToken,
        id: i32,
        pagination: Pagination,
    ) -> AppResult<PagedResult<BookDto>> {
        if !self.repository.authors.base().exists_by_id(token, id).await? {
            return Err(AppError::not_found("Author", id));
        }

        let filter = BookFilter {
            author_id: Some(id),
            ..Default::default()
        };
        self.books.find(token, &filter, pagination).await
    }
}
