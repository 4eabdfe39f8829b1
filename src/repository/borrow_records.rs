//! Borrow records repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};
use tokio_util::sync::CancellationToken;

use super::base::{cancellable, BaseRepository, ColumnWriter, Entity};
use crate::{
    error::AppResult,
    models::{
        borrow_record::{BorrowRecordFilter, BorrowRecordRow},
        BorrowRecord, Pagination,
    },
};

const RECORD_DETAILS: &str = r#"
    SELECT r.*,
           b.title AS book_title,
           p.first_name AS patron_first_name,
           p.last_name AS patron_last_name
    FROM borrow_records r
    JOIN books b ON b.id = r.book_id
    JOIN patrons p ON p.id = r.patron_id
    WHERE 1=1"#;

const RECORD_COUNT: &str = "SELECT COUNT(*) FROM borrow_records r WHERE 1=1";

impl Entity for BorrowRecord {
    const TABLE: &'static str = "borrow_records";
    const LABEL: &'static str = "Borrow record";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn write_columns(&self, columns: &mut ColumnWriter<'_>) {
        columns
            .column("book_id", self.book_id)
            .column("patron_id", self.patron_id)
            .column("borrow_date", self.borrow_date)
            .column("due_date", self.due_date)
            .column("return_date", self.return_date)
            .column("status", self.status);
    }
}

fn push_filter(q: &mut QueryBuilder<'static, Postgres>, filter: &BorrowRecordFilter, now: DateTime<Utc>) {
    if let Some(patron_id) = filter.patron_id {
        q.push(" AND r.patron_id = ").push_bind(patron_id);
    }
    if let Some(book_id) = filter.book_id {
        q.push(" AND r.book_id = ").push_bind(book_id);
    }
    match filter.is_overdue {
        Some(true) => {
            q.push(" AND r.return_date IS NULL AND r.due_date < ").push_bind(now);
        }
        Some(false) => {
            q.push(" AND NOT (r.return_date IS NULL AND r.due_date < ")
                .push_bind(now)
                .push(")");
        }
        None => {}
    }
}

fn details_query(id: i32) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(RECORD_DETAILS);
    query.push(" AND r.id = ").push_bind(id);
    query
}

fn overdue_query(now: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(RECORD_DETAILS);
    query
        .push(" AND r.return_date IS NULL AND r.due_date < ")
        .push_bind(now)
        .push(" ORDER BY r.due_date, r.id");
    query
}

#[derive(Clone)]
pub struct BorrowRecordsRepository {
    base: BaseRepository<BorrowRecord>,
}

impl BorrowRecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    pub fn base(&self) -> &BaseRepository<BorrowRecord> {
        &self.base
    }

    /// One record with book title and patron name
    pub async fn get_details(
        &self,
        token: &CancellationToken,
        id: i32,
    ) -> AppResult<Option<BorrowRecordRow>> {
        let mut query = details_query(id);

        cancellable(token, async {
            Ok(query
                .build_query_as::<BorrowRecordRow>()
                .fetch_optional(self.base.pool())
                .await?)
        })
        .await
    }

    /// Same as [`Self::get_details`], on a caller-held connection or transaction
    pub async fn get_details_in(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<BorrowRecordRow>> {
        Ok(details_query(id)
            .build_query_as::<BorrowRecordRow>()
            .fetch_optional(conn)
            .await?)
    }

    /// Filtered page, newest borrows first. Overdue is judged against `now`.
    pub async fn list(
        &self,
        token: &CancellationToken,
        filter: &BorrowRecordFilter,
        now: DateTime<Utc>,
        pagination: Pagination,
    ) -> AppResult<(Vec<BorrowRecordRow>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(RECORD_COUNT);
        push_filter(&mut count, filter, now);

        let mut select = QueryBuilder::<Postgres>::new(RECORD_DETAILS);
        push_filter(&mut select, filter, now);
        select
            .push(" ORDER BY r.borrow_date DESC, r.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let pool = self.base.pool();
        cancellable(token, async {
            let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;
            let rows = select
                .build_query_as::<BorrowRecordRow>()
                .fetch_all(pool)
                .await?;
            Ok((rows, total))
        })
        .await
    }

    /// Active records due before `now`, earliest due first
    pub async fn overdue(
        &self,
        token: &CancellationToken,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BorrowRecordRow>> {
        let mut query = overdue_query(now);

        cancellable(token, async {
            Ok(query
                .build_query_as::<BorrowRecordRow>()
                .fetch_all(self.base.pool())
                .await?)
        })
        .await
    }

    /// Persist a return. `false` when the record is missing or was closed in
    /// the meantime.
    pub async fn close(&self, token: &CancellationToken, record: &BorrowRecord) -> AppResult<bool> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE borrow_records SET return_date = ");
        query
            .push_bind(record.return_date)
            .push(", status = ")
            .push_bind(record.status)
            .push(" WHERE id = ")
            .push_bind(record.id)
            .push(" AND return_date IS NULL");

        cancellable(token, async {
            let result = query.build().execute(self.base.pool()).await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Whether `patron_id` currently has `book_id` out
    pub async fn has_active_borrow(
        &self,
        token: &CancellationToken,
        book_id: i32,
        patron_id: i32,
    ) -> AppResult<bool> {
        self.base
            .exists(token, |q| {
                q.push("book_id = ")
                    .push_bind(book_id)
                    .push(" AND patron_id = ")
                    .push_bind(patron_id)
                    .push(" AND return_date IS NULL");
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered_sql(filter: &BorrowRecordFilter) -> String {
        let mut q = QueryBuilder::<Postgres>::new("SELECT 1 WHERE 1=1");
        push_filter(&mut q, filter, Utc::now());
        q.sql().to_string()
    }

    #[test]
    fn test_overdue_filter() {
        let only_overdue = BorrowRecordFilter {
            patron_id: Some(2),
            is_overdue: Some(true),
            ..Default::default()
        };
        assert_eq!(
            filtered_sql(&only_overdue),
            "SELECT 1 WHERE 1=1 AND r.patron_id = $1 AND r.return_date IS NULL AND r.due_date < $2"
        );

        let not_overdue = BorrowRecordFilter {
            is_overdue: Some(false),
            ..Default::default()
        };
        assert_eq!(
            filtered_sql(&not_overdue),
            "SELECT 1 WHERE 1=1 AND NOT (r.return_date IS NULL AND r.due_date < $1)"
        );
    }

    #[test]
    fn test_overdue_query() {
        let query = overdue_query(Utc::now());
        let sql = query.sql();
        assert!(sql.starts_with(RECORD_DETAILS));
        assert!(sql.ends_with(
            "WHERE 1=1 AND r.return_date IS NULL AND r.due_date < $1 ORDER BY r.due_date, r.id"
        ));
    }

    #[test]
    fn test_details_query() {
        assert!(details_query(4).sql().ends_with("WHERE 1=1 AND r.id = $1"));
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(filtered_sql(&BorrowRecordFilter::default()), "SELECT 1 WHERE 1=1");
    }
}
