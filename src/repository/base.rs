//! Generic repository shared by every entity table.
//!
//! An [`Entity`] describes its table and how to write its columns; the
//! [`BaseRepository`] turns that into get/list/add/update/remove/exists
//! statements. Each mutation commits on its own. Every call takes the
//! request's [`CancellationToken`] and stops waiting on the database once it
//! fires.

use std::future::Future;
use std::marker::PhantomData;

use sqlx::{
    postgres::PgRow, Encode, FromRow, PgConnection, Pool, Postgres, QueryBuilder, Row, Type,
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::Pagination,
};

/// A table-backed entity with an integer `id` primary key
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Name used in not-found messages
    const LABEL: &'static str;

    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);

    /// Write every column except `id`, in a fixed order
    fn write_columns(&self, columns: &mut ColumnWriter<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Names,
    Values,
    Assignments,
}

/// Emits an entity's columns as a name list, a value list or `SET` assignments
pub struct ColumnWriter<'b> {
    builder: &'b mut QueryBuilder<'static, Postgres>,
    mode: Mode,
    written: usize,
}

impl<'b> ColumnWriter<'b> {
    fn new(builder: &'b mut QueryBuilder<'static, Postgres>, mode: Mode) -> Self {
        Self {
            builder,
            mode,
            written: 0,
        }
    }

    pub fn column<V>(&mut self, name: &'static str, value: V) -> &mut Self
    where
        V: Encode<'static, Postgres> + Type<Postgres> + Send + 'static,
    {
        if self.written > 0 {
            self.builder.push(", ");
        }
        self.written += 1;

        match self.mode {
            Mode::Names => {
                self.builder.push(name);
            }
            Mode::Values => {
                self.builder.push_bind(value);
            }
            Mode::Assignments => {
                self.builder.push(name).push(" = ").push_bind(value);
            }
        }
        self
    }
}

/// Run `fut` unless `token` is cancelled first
pub async fn cancellable<F, T>(token: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}

/// `%term%` for ILIKE with `\`, `%` and `_` escaped
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn insert_query<T: Entity>(entity: &T) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", T::TABLE));
    entity.write_columns(&mut ColumnWriter::new(&mut builder, Mode::Names));
    builder.push(") VALUES (");
    entity.write_columns(&mut ColumnWriter::new(&mut builder, Mode::Values));
    builder.push(") RETURNING id");
    builder
}

pub(crate) fn update_query<T: Entity>(entity: &T) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
    entity.write_columns(&mut ColumnWriter::new(&mut builder, Mode::Assignments));
    builder.push(" WHERE id = ").push_bind(entity.id());
    builder
}

/// CRUD over one entity table
pub struct BaseRepository<T> {
    pool: Pool<Postgres>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> BaseRepository<T> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Get by primary key
    pub async fn get(&self, token: &CancellationToken, id: i32) -> AppResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        cancellable(token, async {
            let row = sqlx::query_as::<_, T>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        })
        .await
    }

    /// Get by primary key, not-found error when absent
    pub async fn get_required(&self, token: &CancellationToken, id: i32) -> AppResult<T> {
        self.get(token, id)
            .await?
            .ok_or_else(|| AppError::not_found(T::LABEL, id))
    }

    /// All rows, ordered by id
    pub async fn list(&self, token: &CancellationToken) -> AppResult<Vec<T>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", T::TABLE);
        cancellable(token, async {
            let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
            Ok(rows)
        })
        .await
    }

    /// Insert and commit; assigns the generated id to `entity`
    pub async fn add(&self, token: &CancellationToken, entity: &mut T) -> AppResult<()> {
        let mut builder = insert_query(entity);
        let id = cancellable(token, async {
            let row = builder.build().fetch_one(&self.pool).await?;
            Ok(row.try_get::<i32, _>("id")?)
        })
        .await?;
        entity.set_id(id);
        Ok(())
    }

    /// Insert on an open connection or transaction; the caller commits
    pub async fn add_in(&self, conn: &mut PgConnection, entity: &mut T) -> AppResult<()> {
        let mut builder = insert_query(entity);
        let row = builder.build().fetch_one(&mut *conn).await?;
        entity.set_id(row.try_get::<i32, _>("id")?);
        Ok(())
    }

    /// Write every column of `entity` back to its row
    pub async fn update(&self, token: &CancellationToken, entity: &T) -> AppResult<()> {
        let mut builder = update_query(entity);
        let result = cancellable(token, async {
            Ok(builder.build().execute(&self.pool).await?)
        })
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(T::LABEL, entity.id()));
        }
        Ok(())
    }

    pub async fn remove(&self, token: &CancellationToken, entity: &T) -> AppResult<()> {
        if !self.remove_by_id(token, entity.id()).await? {
            return Err(AppError::not_found(T::LABEL, entity.id()));
        }
        Ok(())
    }

    /// Delete by key; `false` when no row matched
    pub async fn remove_by_id(&self, token: &CancellationToken, id: i32) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        cancellable(token, async {
            let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// `SELECT EXISTS` over a predicate written by `predicate`
    pub async fn exists<F>(&self, token: &CancellationToken, predicate: F) -> AppResult<bool>
    where
        F: FnOnce(&mut QueryBuilder<'static, Postgres>),
    {
        let mut builder = QueryBuilder::new(format!("SELECT EXISTS(SELECT 1 FROM {} WHERE ", T::TABLE));
        predicate(&mut builder);
        builder.push(")");
        cancellable(token, async {
            let row = builder.build().fetch_one(&self.pool).await?;
            Ok(row.try_get::<bool, _>(0)?)
        })
        .await
    }

    pub async fn exists_by_id(&self, token: &CancellationToken, id: i32) -> AppResult<bool> {
        self.exists(token, |q| {
            q.push("id = ").push_bind(id);
        })
        .await
    }

    /// Lowest id in the table, `None` when it is empty
    pub async fn first_id(&self, token: &CancellationToken) -> AppResult<Option<i32>> {
        let sql = format!("SELECT MIN(id) FROM {}", T::TABLE);
        cancellable(token, async {
            Ok(sqlx::query_scalar::<_, Option<i32>>(&sql)
                .fetch_one(&self.pool)
                .await?)
        })
        .await
    }

    /// Escape hatch: `SELECT * FROM <table> WHERE 1=1`, ready for ` AND ...` filters
    pub fn query(&self) -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!("SELECT * FROM {} WHERE 1=1", T::TABLE))
    }

    /// Count and fetch one page of rows matching `filter`.
    ///
    /// `filter` is applied to both the count and the select, so it should
    /// only push ` AND ...` clauses.
    pub async fn fetch_page<F>(
        &self,
        token: &CancellationToken,
        filter: F,
        order_by: &str,
        pagination: Pagination,
    ) -> AppResult<(Vec<T>, i64)>
    where
        F: Fn(&mut QueryBuilder<'static, Postgres>),
    {
        let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE 1=1", T::TABLE));
        filter(&mut count);

        let mut select = self.query();
        filter(&mut select);
        select
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        cancellable(token, async {
            let total: i64 = count.build().fetch_one(&self.pool).await?.try_get(0)?;
            let rows = select.build_query_as::<T>().fetch_all(&self.pool).await?;
            Ok((rows, total))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BorrowRecord, Patron};
    use chrono::{Duration, Utc};
    use std::time::Duration as StdDuration;

    #[test]
    fn test_insert_query() {
        let record = BorrowRecord::open(1, 2, Utc::now(), Duration::days(14));
        let builder = insert_query(&record);
        assert_eq!(
            builder.sql(),
            "INSERT INTO borrow_records (book_id, patron_id, borrow_date, due_date, return_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"
        );
    }

    #[test]
    fn test_update_query() {
        let patron = Patron {
            id: 5,
            first_name: "Nika".to_string(),
            last_name: "K.".to_string(),
            email: "nika@example.com".to_string(),
            membership_date: Utc::now(),
        };
        let builder = update_query(&patron);
        assert_eq!(
            builder.sql(),
            "UPDATE patrons SET first_name = $1, last_name = $2, email = $3, membership_date = $4 WHERE id = $5"
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("orwell"), "%orwell%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[tokio::test]
    async fn test_cancellable_stops_on_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let result: AppResult<()> = cancellable(&token, async {
            tokio::time::sleep(StdDuration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellable_passes_result_through() {
        let token = CancellationToken::new();
        let result = cancellable(&token, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
