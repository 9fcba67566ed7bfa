//! Database repository for dashboard groups.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::groups::{GroupCreateDBRequest, GroupDBResponse, GroupUpdateDBRequest},
};
use crate::types::GroupId;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing groups. Every listing returns all groups in display order.
#[derive(Debug, Clone, Default)]
pub struct GroupFilter;

impl GroupFilter {
    pub fn new() -> Self {
        Self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Group {
    pub id: GroupId,
    pub title: String,
    pub orderby: i32,
}

pub struct Groups<'c> {
    db: &'c mut PgConnection,
}

impl From<Group> for GroupDBResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            orderby: group.orderby,
        }
    }
}

impl<'c> Groups<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Groups<'c> {
    type CreateRequest = GroupCreateDBRequest;
    type UpdateRequest = GroupUpdateDBRequest;
    type Response = GroupDBResponse;
    type Id = GroupId;
    type Filter = GroupFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let group = sqlx::query_as::<_, Group>("INSERT INTO groups (title, orderby) VALUES ($1, $2) RETURNING id, title, orderby")
            .bind(&request.title)
            .bind(request.orderby)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(GroupDBResponse::from(group))
    }

    #[instrument(skip(self), fields(group_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, title, orderby FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(group.map(GroupDBResponse::from))
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, title, orderby FROM groups ORDER BY orderby, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(groups.into_iter().map(GroupDBResponse::from).collect())
    }

    /// Links of a deleted group are kept with a null `group_id` by the foreign key.
    #[instrument(skip(self), fields(group_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(group_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups SET
                title = COALESCE($2, title),
                orderby = COALESCE($3, orderby)
            WHERE id = $1
            RETURNING id, title, orderby
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(request.orderby)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(GroupDBResponse::from(group))
    }

    #[instrument(skip(self), err)]
    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM groups").execute(&mut *self.db).await?;
        Ok(result.rows_affected())
    }
}
