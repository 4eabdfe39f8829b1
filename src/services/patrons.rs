//! Patron management service

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{
        patron::{CreatePatron, UpdatePatron},
        BookDto, PagedResult, Pagination, Patron, PatronDto,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PatronService {
    repository: Repository,
}

impl PatronService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        token: &CancellationToken,
        pagination: Pagination,
    ) -> AppResult<PagedResult<PatronDto>> {
        let (patrons, total) = self.repository.patrons.page(token, pagination).await?;
        Ok(PagedResult::new(patrons, pagination, total).map(PatronDto::from))
    }

    pub async fn get(&self, token: &CancellationToken, id: i32) -> AppResult<PatronDto> {
        let patron = self.repository.patrons.base().get_required(token, id).await?;
        Ok(patron.into())
    }

    /// Register a patron; membership starts now
    pub async fn create(&self, token: &CancellationToken, data: CreatePatron) -> AppResult<PatronDto> {
        let mut patron = Patron::register(data, Utc::now());
        self.repository.patrons.base().add(token, &mut patron).await?;
        tracing::info!("Registered patron {}", patron.id);
        Ok(patron.into())
    }

    pub async fn update(&self, token: &CancellationToken, id: i32, data: UpdatePatron) -> AppResult<()> {
        let mut patron = self.repository.patrons.base().get_required(token, id).await?;
        patron.apply(data);
        self.repository.patrons.base().update(token, &patron).await
    }

    pub async fn delete(&self, token: &CancellationToken, id: i32) -> AppResult<()> {
        let base = self.repository.patrons.base();
        if !base.exists_by_id(token, id).await? {
            return Err(AppError::not_found("Patron", id));
        }
        base.remove_by_id(token, id).await?;
        tracing::info!("Deleted patron {}", id);
        Ok(())
    }

    /// Books the patron currently has out
    pub async fn borrowed_books(&self, token: &CancellationToken, id: i32) -> AppResult<Vec<BookDto>> {
        if !self.repository.patrons.base().exists_by_id(token, id).await? {
            return Err(AppError::not_found("Patron", id));
        }

        let rows = self.repository.books.borrowed_by_patron(token, id).await?;
        Ok(rows.into_iter().map(BookDto::from).collect())
    }
}
