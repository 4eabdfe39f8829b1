//! Checkout and return workflow

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow_record::{BorrowRecordFilter, CreateBorrowRecord},
        BorrowRecord, BorrowRecordDto, PagedResult, Pagination,
    },
    repository::{base::cancellable, Repository},
};

use super::books::BookService;

#[derive(Clone)]
pub struct BorrowRecordService {
    repository: Repository,
    books: BookService,
    loan_period: Duration,
}

impl BorrowRecordService {
    pub fn new(repository: Repository, books: BookService, loan_period_days: i64) -> Self {
        Self {
            repository,
            books,
            loan_period: Duration::days(loan_period_days),
        }
    }

    /// Check a book out to a patron.
    ///
    /// The availability check and the insert share one transaction holding
    /// the book row lock, so two checkouts of the last copy cannot both pass.
    pub async fn check_out(
        &self,
        token: &CancellationToken,
        data: CreateBorrowRecord,
    ) -> AppResult<BorrowRecordDto> {
        let CreateBorrowRecord { book_id, patron_id } = data;

        if !self.repository.patrons.base().exists_by_id(token, patron_id).await? {
            return Err(AppError::not_found("Patron", patron_id));
        }

        // The response row is read inside the transaction so nothing cancellable
        // runs after the commit.
        let row = cancellable(token, async {
            let mut tx = self.repository.begin().await?;

            if let Err(e) = self.books.reserve(&mut *tx, book_id).await {
                tracing::warn!("Checkout of book {} by patron {} rejected: {}", book_id, patron_id, e);
                return Err(e);
            }

            let mut record = BorrowRecord::open(book_id, patron_id, Utc::now(), self.loan_period);
            let borrow_records = &self.repository.borrow_records;
            borrow_records.base().add_in(&mut *tx, &mut record).await?;
            let row = borrow_records
                .get_details_in(&mut *tx, record.id)
                .await?
                .ok_or_else(|| AppError::not_found("Borrow record", record.id))?;
            tx.commit().await?;
            Ok(row)
        })
        .await?;

        tracing::info!(
            "Book {} checked out by patron {} (record {}, due {})",
            row.record.book_id,
            row.record.patron_id,
            row.record.id,
            row.record.due_date
        );
        Ok(BorrowRecordDto::from_row(row, Utc::now()))
    }

    /// Close an active record. Missing and already-returned records fail the same way.
    pub async fn return_book(&self, token: &CancellationToken, id: i32) -> AppResult<()> {
        let mut record = self
            .repository
            .borrow_records
            .base()
            .get(token, id)
            .await?
            .ok_or(AppError::BorrowRecordNotFound(id))?;

        record.mark_returned(Utc::now())?;
        if !self.repository.borrow_records.close(token, &record).await? {
            return Err(AppError::BorrowRecordNotFound(id));
        }

        tracing::info!("Book {} returned by patron {} (record {})", record.book_id, record.patron_id, id);
        Ok(())
    }

    pub async fn get(&self, token: &CancellationToken, id: i32) -> AppResult<BorrowRecordDto> {
        let row = self
            .repository
            .borrow_records
            .get_details(token, id)
            .await?
            .ok_or_else(|| AppError::not_found("Borrow record", id))?;
        Ok(BorrowRecordDto::from_row(row, Utc::now()))
    }

    pub async fn list(
        &self,
        token: &CancellationToken,
        filter: &BorrowRecordFilter,
        pagination: Pagination,
    ) -> AppResult<PagedResult<BorrowRecordDto>> {
        let now = Utc::now();
        let (rows, total) = self
            .repository
            .borrow_records
            .list(token, filter, now, pagination)
            .await?;
        Ok(PagedResult::new(rows, pagination, total).map(|row| BorrowRecordDto::from_row(row, now)))
    }

    /// Active records past their due date
    pub async fn overdue(&self, token: &CancellationToken) -> AppResult<Vec<BorrowRecordDto>> {
        let now = Utc::now();
        let rows = self.repository.borrow_records.overdue(token, now).await?;
        Ok(rows
            .into_iter()
            .map(|row| BorrowRecordDto::from_row(row, now))
            .collect())
    }
}
