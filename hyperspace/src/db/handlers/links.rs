//! Database repository for links.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::links::{LinkCreateDBRequest, LinkDBResponse, LinkUpdateDBRequest},
};
use crate::types::{GroupId, LinkId};
use sqlx::{FromRow, PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing links
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub group_ids: Option<Vec<GroupId>>, // None = all links, orphans included
}

impl LinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, group_ids: Vec<GroupId>) -> Self {
        self.group_ids = Some(group_ids);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Link {
    pub id: LinkId,
    pub group_id: Option<GroupId>,
    pub title: String,
    pub link: String,
    pub imageurl: Option<String>,
    pub notes: Option<String>,
    pub orderby: i32,
}

const LINK_COLUMNS: &str = "id, group_id, title, link, imageurl, notes, orderby";

pub struct Links<'c> {
    db: &'c mut PgConnection,
}

impl From<Link> for LinkDBResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            group_id: link.group_id,
            title: link.title,
            link: link.link,
            imageurl: link.imageurl,
            notes: link.notes,
            orderby: link.orderby,
        }
    }
}

impl<'c> Links<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Links<'c> {
    type CreateRequest = LinkCreateDBRequest;
    type UpdateRequest = LinkUpdateDBRequest;
    type Response = LinkDBResponse;
    type Id = LinkId;
    type Filter = LinkFilter;

    #[instrument(skip(self, request), fields(group_id = request.group_id, title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "INSERT INTO links (group_id, title, link, imageurl, notes, orderby) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {LINK_COLUMNS}"
        ))
        .bind(request.group_id)
        .bind(&request.title)
        .bind(&request.link)
        .bind(request.imageurl.as_deref().filter(|s| !s.is_empty()))
        .bind(request.notes.as_deref().filter(|s| !s.is_empty()))
        .bind(request.orderby)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(LinkDBResponse::from(link))
    }

    #[instrument(skip(self), fields(link_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let link = sqlx::query_as::<_, Link>(&format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(link.map(LinkDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(format!("SELECT {LINK_COLUMNS} FROM links WHERE 1=1"));

        if let Some(ref group_ids) = filter.group_ids {
            query.push(" AND group_id = ANY(");
            query.push_bind(group_ids.clone());
            query.push(")");
        }

        query.push(" ORDER BY orderby, id");

        let links = query.build_query_as::<Link>().fetch_all(&mut *self.db).await?;

        Ok(links.into_iter().map(LinkDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(link_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Absent fields keep their stored value; an empty `imageurl` or `notes` clears it.
    #[instrument(skip(self, request), fields(link_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let link = sqlx::query_as::<_, Link>(&format!(
            r#"
            UPDATE links SET
                group_id = COALESCE($2, group_id),
                title = COALESCE($3, title),
                link = COALESCE($4, link),
                imageurl = CASE WHEN $5::text IS NULL THEN imageurl ELSE NULLIF($5, '') END,
                notes = CASE WHEN $6::text IS NULL THEN notes ELSE NULLIF($6, '') END,
                orderby = COALESCE($7, orderby)
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.group_id)
        .bind(&request.title)
        .bind(&request.link)
        .bind(&request.imageurl)
        .bind(&request.notes)
        .bind(request.orderby)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(LinkDBResponse::from(link))
    }

    #[instrument(skip(self), err)]
    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM links").execute(&mut *self.db).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Groups;
    use crate::db::models::groups::GroupCreateDBRequest;
    use sqlx::PgPool;

    async fn create_group(conn: &mut PgConnection, title: &str) -> GroupId {
        Groups::new(conn)
            .create(&GroupCreateDBRequest {
                title: title.to_string(),
                orderby: 0,
            })
            .await
            .unwrap()
            .id
    }

    fn link(group_id: GroupId, title: &str, orderby: i32) -> LinkCreateDBRequest {
        LinkCreateDBRequest {
            group_id,
            title: title.to_string(),
            link: format!("https://{}.example", title.to_lowercase()),
            imageurl: None,
            notes: None,
            orderby,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_link_in_missing_group_is_fk_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = Links::new(&mut conn).create(&link(4242, "Mail", 0)).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_group_and_orders(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let apps = create_group(&mut conn, "Apps").await;
        let media = create_group(&mut conn, "Media").await;

        let mut repo = Links::new(&mut conn);
        let second = repo.create(&link(apps, "Calendar", 1)).await.unwrap();
        let first = repo.create(&link(apps, "Mail", 0)).await.unwrap();
        repo.create(&link(media, "Music", 0)).await.unwrap();

        let apps_links: Vec<LinkId> = repo
            .list(&LinkFilter::new().with_groups(vec![apps]))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(apps_links, vec![first.id, second.id]);

        assert_eq!(repo.list(&LinkFilter::new()).await.unwrap().len(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_keeps_absent_and_clears_empty(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let apps = create_group(&mut conn, "Apps").await;

        let mut repo = Links::new(&mut conn);
        let created = repo
            .create(&LinkCreateDBRequest {
                imageurl: Some("1-mail.png".to_string()),
                notes: Some("<p>inbox</p>".to_string()),
                ..link(apps, "Mail", 2)
            })
            .await
            .unwrap();

        let renamed = repo
            .update(
                created.id,
                &LinkUpdateDBRequest {
                    title: Some("Webmail".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Webmail");
        assert_eq!(renamed.imageurl.as_deref(), Some("1-mail.png"));
        assert_eq!(renamed.notes.as_deref(), Some("<p>inbox</p>"));
        assert_eq!(renamed.orderby, 2);
        assert_eq!(renamed.group_id, Some(apps));

        let cleared = repo
            .update(
                created.id,
                &LinkUpdateDBRequest {
                    imageurl: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.imageurl, None);
        assert_eq!(cleared.notes.as_deref(), Some("<p>inbox</p>"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_link(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let apps = create_group(&mut conn, "Apps").await;

        let mut repo = Links::new(&mut conn);
        let created = repo.create(&link(apps, "Mail", 0)).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
