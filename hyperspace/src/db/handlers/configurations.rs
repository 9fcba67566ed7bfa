//! Database repository for configuration rows.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::configurations::{ConfigurationCreateDBRequest, ConfigurationDBResponse, ConfigurationUpdateDBRequest},
};
use crate::types::ConfigurationId;
use sqlx::{FromRow, PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing configurations
#[derive(Debug, Clone, Default)]
pub struct ConfigurationFilter {
    pub title: Option<String>,
}

impl ConfigurationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, FromRow)]
struct Configuration {
    pub id: ConfigurationId,
    pub title: String,
    pub datavalue: Option<String>,
}

pub struct Configurations<'c> {
    db: &'c mut PgConnection,
}

impl From<Configuration> for ConfigurationDBResponse {
    fn from(row: Configuration) -> Self {
        Self {
            id: row.id,
            title: row.title,
            datavalue: row.datavalue,
        }
    }
}

impl<'c> Configurations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Configurations<'c> {
    type CreateRequest = ConfigurationCreateDBRequest;
    type UpdateRequest = ConfigurationUpdateDBRequest;
    type Response = ConfigurationDBResponse;
    type Id = ConfigurationId;
    type Filter = ConfigurationFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, Configuration>(
            "INSERT INTO configurations (title, datavalue) VALUES ($1, $2) RETURNING id, title, datavalue",
        )
        .bind(&request.title)
        .bind(&request.datavalue)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ConfigurationDBResponse::from(row))
    }

    #[instrument(skip(self), fields(configuration_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, Configuration>("SELECT id, title, datavalue FROM configurations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(ConfigurationDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT id, title, datavalue FROM configurations WHERE 1=1");

        if let Some(ref title) = filter.title {
            query.push(" AND title = ");
            query.push_bind(title.clone());
        }

        query.push(" ORDER BY id");

        let rows = query.build_query_as::<Configuration>().fetch_all(&mut *self.db).await?;

        Ok(rows.into_iter().map(ConfigurationDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(configuration_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM configurations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(configuration_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, Configuration>(
            "UPDATE configurations SET title = $2, datavalue = $3 WHERE id = $1 RETURNING id, title, datavalue",
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.datavalue)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ConfigurationDBResponse::from(row))
    }

    #[instrument(skip(self), err)]
    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM configurations").execute(&mut *self.db).await?;
        Ok(result.rows_affected())
    }
}
