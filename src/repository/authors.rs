//! Authors repository for database operations

use sqlx::{Pool, Postgres};
use tokio_util::sync::CancellationToken;

use super::base::{like_pattern, BaseRepository, ColumnWriter, Entity};
use crate::{
    error::AppResult,
    models::{Author, Pagination},
};

impl Entity for Author {
    const TABLE: &'static str = "authors";
    const LABEL: &'static str = "Author";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn write_columns(&self, columns: &mut ColumnWriter<'_>) {
        columns
            .column("first_name", self.first_name.clone())
            .column("last_name", self.last_name.clone())
            .column("biography", self.biography.clone())
            .column("date_of_birth", self.date_of_birth);
    }
}

#[derive(Clone)]
pub struct AuthorsRepository {
    base: BaseRepository<Author>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    pub fn base(&self) -> &BaseRepository<Author> {
        &self.base
    }

    /// Page of authors, optionally filtered by a substring of either name
    pub async fn page(
        &self,
        token: &CancellationToken,
        name: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<(Vec<Author>, i64)> {
        let pattern = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(like_pattern);

        self.base
            .fetch_page(
                token,
                |q| {
                    if let Some(ref pattern) = pattern {
                        q.push(" AND (first_name ILIKE ")
                            .push_bind(pattern.clone())
                            .push(" OR last_name ILIKE ")
                            .push_bind(pattern.clone())
                            .push(")");
                    }
                },
                "last_name, first_name, id",
                pagination,
            )
            .await
    }

    /// Author matched on full name, used when seeding
    pub async fn find_by_name(
        &self,
        token: &CancellationToken,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<Option<Author>> {
        let mut query = self.base.query();
        query
            .push(" AND first_name = ")
            .push_bind(first_name.to_string())
            .push(" AND last_name = ")
            .push_bind(last_name.to_string())
            .push(" ORDER BY id LIMIT 1");

        super::base::cancellable(token, async {
            Ok(query
                .build_query_as::<Author>()
                .fetch_optional(self.base.pool())
                .await?)
        })
        .await
    }
}
