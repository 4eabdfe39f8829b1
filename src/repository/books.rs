//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};
use tokio_util::sync::CancellationToken;

use super::base::{cancellable, like_pattern, BaseRepository, ColumnWriter, Entity};
use crate::{
    error::AppResult,
    models::{
        book::{BookFilter, BookRow},
        Book, BookAvailability, Pagination,
    },
};

/// Book joined with its author's names and its active borrow count
const BOOK_DETAILS: &str = r#"
    SELECT b.*,
           a.first_name AS author_first_name,
           a.last_name AS author_last_name,
           (SELECT COUNT(*) FROM borrow_records br
            WHERE br.book_id = b.id AND br.return_date IS NULL) AS active_borrows
    FROM books b
    JOIN authors a ON a.id = b.author_id
    WHERE 1=1"#;

/// Book details for each active record of one patron; the patron id is bound last
const PATRON_BOOKS: &str = r#"
    SELECT b.*,
           a.first_name AS author_first_name,
           a.last_name AS author_last_name,
           (SELECT COUNT(*) FROM borrow_records br
            WHERE br.book_id = b.id AND br.return_date IS NULL) AS active_borrows
    FROM borrow_records pr
    JOIN books b ON b.id = pr.book_id
    JOIN authors a ON a.id = b.author_id
    WHERE pr.return_date IS NULL AND pr.patron_id = "#;

const BOOK_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM books b
    JOIN authors a ON a.id = b.author_id
    WHERE 1=1"#;

impl Entity for Book {
    const TABLE: &'static str = "books";
    const LABEL: &'static str = "Book";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn write_columns(&self, columns: &mut ColumnWriter<'_>) {
        columns
            .column("title", self.title.clone())
            .column("isbn", self.isbn.clone())
            .column("publication_year", self.publication_year)
            .column("description", self.description.clone())
            .column("cover_image_url", self.cover_image_url.clone())
            .column("quantity", self.quantity)
            .column("author_id", self.author_id);
    }
}

/// Append the ` AND ...` clauses for `filter` to a query over `books b JOIN authors a`
fn push_filter(q: &mut QueryBuilder<'static, Postgres>, filter: &BookFilter) {
    if let Some(title) = filter.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        q.push(" AND b.title ILIKE ").push_bind(like_pattern(title));
    }

    if let Some(author) = filter.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        let pattern = like_pattern(author);
        q.push(" AND (a.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR (a.first_name || ' ' || a.last_name) ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(author_id) = filter.author_id {
        q.push(" AND b.author_id = ").push_bind(author_id);
    }
}

fn patron_books_query(patron_id: i32) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(PATRON_BOOKS);
    query.push_bind(patron_id).push(" ORDER BY pr.borrow_date, pr.id");
    query
}

#[derive(Clone)]
pub struct BooksRepository {
    base: BaseRepository<Book>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    pub fn base(&self) -> &BaseRepository<Book> {
        &self.base
    }

    /// Page of book details matching `filter`, ordered by title
    pub async fn search(
        &self,
        token: &CancellationToken,
        filter: &BookFilter,
        pagination: Pagination,
    ) -> AppResult<(Vec<BookRow>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(BOOK_COUNT);
        push_filter(&mut count, filter);

        let mut select = QueryBuilder::<Postgres>::new(BOOK_DETAILS);
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY b.title, b.id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let pool = self.base.pool();
        cancellable(token, async {
            let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;
            let rows = select.build_query_as::<BookRow>().fetch_all(pool).await?;
            Ok((rows, total))
        })
        .await
    }

    /// One book with author name and active borrow count
    pub async fn get_details(&self, token: &CancellationToken, id: i32) -> AppResult<Option<BookRow>> {
        let mut query = QueryBuilder::<Postgres>::new(BOOK_DETAILS);
        query.push(" AND b.id = ").push_bind(id);

        cancellable(token, async {
            Ok(query
                .build_query_as::<BookRow>()
                .fetch_optional(self.base.pool())
                .await?)
        })
        .await
    }

    /// Availability read on an open connection.
    ///
    /// With `lock`, the book row stays locked `FOR UPDATE` until the
    /// surrounding transaction ends, so concurrent checkouts of the same book
    /// serialize here.
    pub async fn availability_in(
        &self,
        conn: &mut PgConnection,
        id: i32,
        lock: bool,
    ) -> AppResult<Option<BookAvailability>> {
        let sql = if lock {
            "SELECT quantity FROM books WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT quantity FROM books WHERE id = $1"
        };

        let quantity: Option<i32> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(quantity) = quantity else {
            return Ok(None);
        };

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE book_id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some(BookAvailability::new(id, quantity, active)))
    }

    pub async fn availability(
        &self,
        token: &CancellationToken,
        id: i32,
    ) -> AppResult<Option<BookAvailability>> {
        cancellable(token, async {
            let mut conn = self.base.pool().acquire().await?;
            self.availability_in(&mut *conn, id, false).await
        })
        .await
    }

    /// Books currently out with `patron_id`, one row per active record,
    /// oldest borrow first
    pub async fn borrowed_by_patron(
        &self,
        token: &CancellationToken,
        patron_id: i32,
    ) -> AppResult<Vec<BookRow>> {
        let mut query = patron_books_query(patron_id);

        cancellable(token, async {
            Ok(query
                .build_query_as::<BookRow>()
                .fetch_all(self.base.pool())
                .await?)
        })
        .await
    }

    pub async fn find_by_isbn(&self, token: &CancellationToken, isbn: &str) -> AppResult<Option<Book>> {
        let mut query = self.base.query();
        query.push(" AND isbn = ").push_bind(isbn.to_string());

        cancellable(token, async {
            Ok(query
                .build_query_as::<Book>()
                .fetch_optional(self.base.pool())
                .await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clauses() {
        let filter = BookFilter {
            title: Some(" 1984 ".to_string()),
            author: Some("orwell".to_string()),
            author_id: Some(3),
        };
        let mut q = QueryBuilder::<Postgres>::new("SELECT 1 WHERE 1=1");
        push_filter(&mut q, &filter);
        assert_eq!(
            q.sql(),
            "SELECT 1 WHERE 1=1 AND b.title ILIKE $1 AND (a.first_name ILIKE $2 \
             OR a.last_name ILIKE $3 OR (a.first_name || ' ' || a.last_name) ILIKE $4) \
             AND b.author_id = $5"
        );
    }

    #[test]
    fn test_patron_books_one_row_per_record() {
        let query = patron_books_query(7);
        let sql = query.sql();
        assert!(sql.contains("FROM borrow_records pr"));
        assert!(sql.contains("JOIN books b ON b.id = pr.book_id"));
        assert!(!sql.contains("EXISTS"));
        assert!(sql.ends_with("pr.patron_id = $1 ORDER BY pr.borrow_date, pr.id"));
    }

    #[test]
    fn test_blank_filter_adds_nothing() {
        let filter = BookFilter {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let mut q = QueryBuilder::<Postgres>::new("SELECT 1 WHERE 1=1");
        push_filter(&mut q, &filter);
        assert_eq!(q.sql(), "SELECT 1 WHERE 1=1");
    }
}
