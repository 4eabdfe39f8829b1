//! Borrow record model: checkout, return transition and overdue classification

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::pagination::PageQuery;
use crate::error::{AppError, AppResult};

/// Stored status. `Overdue` is never stored, see [`BorrowRecord::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[repr(i16)]
pub enum BorrowStatus {
    Borrowed = 0,
    Returned = 1,
}

/// Borrow record row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub patron_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

impl BorrowRecord {
    /// New active record borrowed at `now`, due after `loan_period`
    pub fn open(book_id: i32, patron_id: i32, now: DateTime<Utc>, loan_period: Duration) -> Self {
        Self {
            id: 0,
            book_id,
            patron_id,
            borrow_date: now,
            due_date: now + loan_period,
            return_date: None,
            status: BorrowStatus::Borrowed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.due_date < now
    }

    /// `Borrowed -> Returned`. Returned is terminal.
    pub fn mark_returned(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if !self.is_active() {
            return Err(AppError::BorrowRecordNotFound(self.id));
        }
        self.return_date = Some(now);
        self.status = BorrowStatus::Returned;
        Ok(())
    }
}

/// Borrow record joined with book title and patron name
#[derive(Debug, Clone, FromRow)]
pub struct BorrowRecordRow {
    #[sqlx(flatten)]
    pub record: BorrowRecord,
    pub book_title: String,
    pub patron_first_name: String,
    pub patron_last_name: String,
}

/// Borrow record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecordDto {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub patron_id: i32,
    pub patron_name: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    /// Active and past its due date at the time of the response
    pub is_overdue: bool,
}

impl BorrowRecordDto {
    pub fn from_row(row: BorrowRecordRow, now: DateTime<Utc>) -> Self {
        let is_overdue = row.record.is_overdue(now);
        Self {
            id: row.record.id,
            book_id: row.record.book_id,
            book_title: row.book_title,
            patron_id: row.record.patron_id,
            patron_name: format!("{} {}", row.patron_first_name, row.patron_last_name),
            borrow_date: row.record.borrow_date,
            due_date: row.record.due_date,
            return_date: row.record.return_date,
            status: row.record.status,
            is_overdue,
        }
    }
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRecord {
    #[validate(range(min = 1, message = "Book id is required"))]
    pub book_id: i32,
    #[validate(range(min = 1, message = "Patron id is required"))]
    pub patron_id: i32,
}

/// Borrow record listing filter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BorrowRecordFilter {
    pub patron_id: Option<i32>,
    pub book_id: Option<i32>,
    /// true: overdue records only, false: records that are not overdue
    pub is_overdue: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl BorrowRecordFilter {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_due_in(now: DateTime<Utc>, days: i64) -> BorrowRecord {
        let mut record = BorrowRecord::open(1, 1, now - Duration::days(14), Duration::days(14));
        record.due_date = now + Duration::days(days);
        record.id = 9;
        record
    }

    #[test]
    fn test_open_sets_due_date() {
        let now = Utc::now();
        let record = BorrowRecord::open(3, 4, now, Duration::days(14));
        assert_eq!(record.borrow_date, now);
        assert_eq!(record.due_date - record.borrow_date, Duration::days(14));
        assert_eq!(record.status, BorrowStatus::Borrowed);
        assert!(record.is_active());
    }

    #[test]
    fn test_return_transition() {
        let now = Utc::now();
        let mut record = record_due_in(now, 3);

        record.mark_returned(now).unwrap();
        assert_eq!(record.return_date, Some(now));
        assert_eq!(record.status, BorrowStatus::Returned);
        assert!(!record.is_active());
    }

    #[test]
    fn test_second_return_fails() {
        let now = Utc::now();
        let mut record = record_due_in(now, 3);
        record.mark_returned(now).unwrap();

        let err = record.mark_returned(now + Duration::hours(1)).unwrap_err();
        assert!(matches!(err, AppError::BorrowRecordNotFound(9)));
        // first return date is kept
        assert_eq!(record.return_date, Some(now));
    }

    #[test]
    fn test_overdue_classification() {
        let now = Utc::now();
        assert!(record_due_in(now, -1).is_overdue(now));
        assert!(!record_due_in(now, 1).is_overdue(now));
        // due exactly now is not yet overdue
        assert!(!record_due_in(now, 0).is_overdue(now));
    }

    #[test]
    fn test_returned_record_never_overdue() {
        let now = Utc::now();
        let mut record = record_due_in(now, -10);
        record.mark_returned(now).unwrap();
        assert!(!record.is_overdue(now + Duration::days(30)));
    }

    #[test]
    fn test_dto_from_row() {
        let now = Utc::now();
        let row = BorrowRecordRow {
            record: record_due_in(now, -2),
            book_title: "1984".to_string(),
            patron_first_name: "Mariam".to_string(),
            patron_last_name: "Barbakadze".to_string(),
        };
        let dto = BorrowRecordDto::from_row(row, now);
        assert_eq!(dto.patron_name, "Mariam Barbakadze");
        assert!(dto.is_overdue);
        assert_eq!(dto.status, BorrowStatus::Borrowed);
    }
}
