//! Patrons repository for database operations

use sqlx::{Pool, Postgres};
use tokio_util::sync::CancellationToken;

use super::base::{cancellable, BaseRepository, ColumnWriter, Entity};
use crate::{
    error::AppResult,
    models::{Pagination, Patron},
};

impl Entity for Patron {
    const TABLE: &'static str = "patrons";
    const LABEL: &'static str = "Patron";

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
            .column("email", self.email.clone())
            .column("membership_date", self.membership_date);
    }
}

#[derive(Clone)]
pub struct PatronsRepository {
    base: BaseRepository<Patron>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    pub fn base(&self) -> &BaseRepository<Patron> {
        &self.base
    }

    /// Page of patrons ordered by last name, then first name
    pub async fn page(
        &self,
        token: &CancellationToken,
        pagination: Pagination,
    ) -> AppResult<(Vec<Patron>, i64)> {
        self.base
            .fetch_page(token, |_| {}, "last_name, first_name, id", pagination)
            .await
    }

    pub async fn find_by_email(&self, token: &CancellationToken, email: &str) -> AppResult<Option<Patron>> {
        let mut query = self.base.query();
        query.push(" AND lower(email) = lower(").push_bind(email.to_string()).push(")");

        cancellable(token, async {
            Ok(query
                .build_query_as::<Patron>()
                .fetch_optional(self.base.pool())
                .await?)
        })
        .await
    }
}
