//! The repository trait shared by the groups, links and configurations tables.

use crate::db::errors::Result;

/// CRUD over one table, borrowed from a connection or transaction for the duration of a call.
///
/// Writes take a request type and return the row as read back, so `RETURNING` values such as
/// a default `orderby` are visible to the caller. `list` always returns rows in display order.
#[async_trait::async_trait]
pub trait Repository {
    type CreateRequest;
    type UpdateRequest;
    type Response;
    type Id: Send + Sync;
    type Filter: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Fails with [`crate::db::errors::DbError::NotFound`] when the row is gone
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// `false` when nothing matched
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Empty the table; used by bundle import before recreating rows
    async fn delete_all(&mut self) -> Result<u64>;
}
