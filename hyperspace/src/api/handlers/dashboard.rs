use crate::AppState;
use crate::dashboard::build_view;
use crate::db::handlers::{Configurations, Repository, configurations::ConfigurationFilter};
use crate::editor::database::load_tree;
use crate::errors::{Error, Result};
use axum::{extract::State, response::Html};

#[utoipa::path(
    get,
    path = "/",
    tag = "dashboard",
    summary = "Dashboard",
    description = "The start page: every group except the settings group, with its links as cards.",
    responses(
        (status = 200, description = "Rendered dashboard", content_type = "text/html", body = String),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let groups = load_tree(&mut pool_conn).await?;
    // Titles are not unique; the oldest row wins
    let setting = Configurations::new(&mut pool_conn)
        .list(&ConfigurationFilter::new().with_title(&state.config.dashboard.background_title))
        .await?
        .into_iter()
        .next()
        .and_then(|row| row.datavalue);

    let view = build_view(groups, setting.as_deref(), &state.config.dashboard);
    let html = state.dashboard.render(&view).map_err(|e| Error::Internal {
        operation: format!("render dashboard: {e}"),
    })?;
    Ok(Html(html))
}
