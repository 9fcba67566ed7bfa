//! Read-only dashboard page served at `/`.
//!
//! Groups are shown in rank order as columns of link cards. The configured settings group is
//! hidden; it only carries settings such as the background image.

pub mod sanitize;

use crate::api::models::groups::GroupResponse;
use crate::config::DashboardConfig;
use minijinja::{Environment, context};
use serde::Serialize;

const TEMPLATE_NAME: &str = "dashboard.html";

/// Everything the template needs, already resolved and sanitised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub background: String,
    pub groups: Vec<DashboardGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardGroup {
    pub title: String,
    pub links: Vec<DashboardLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLink {
    pub title: String,
    /// Shown as text
    pub link: String,
    /// Clickable target; `None` when the URL scheme is not allowed, so the card renders inert
    pub href: Option<String>,
    pub icon: Option<String>,
    /// Sanitised HTML, safe to render unescaped
    pub notes: Option<String>,
}

/// URL of an image value: absolute paths and URLs are used as-is, anything else is taken to
/// be a stored upload name.
fn image_src(value: &str) -> String {
    if value.starts_with('/') || value.contains("://") {
        value.to_string()
    } else {
        format!("/uploads/{value}")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pick the background image.
///
/// The configuration row wins; then the settings group's background link (its URL, falling
/// back to its uploaded image); then the configured default.
pub fn resolve_background(setting: Option<&str>, groups: &[GroupResponse], config: &DashboardConfig) -> String {
    if let Some(value) = non_empty(setting) {
        return image_src(value);
    }

    let settings_link = groups
        .iter()
        .find(|g| g.title == config.settings_group)
        .and_then(|g| g.links.as_ref())
        .and_then(|links| links.iter().find(|l| l.title == config.background_title));

    if let Some(link) = settings_link {
        if let Some(url) = non_empty(Some(&link.link)) {
            return url.to_string();
        }
        if let Some(image) = non_empty(link.imageurl.as_deref()) {
            return image_src(image);
        }
    }

    config.default_background.clone()
}

pub fn build_view(groups: Vec<GroupResponse>, background_setting: Option<&str>, config: &DashboardConfig) -> DashboardView {
    let background = resolve_background(background_setting, &groups, config);

    let groups = groups
        .into_iter()
        .filter(|g| g.title != config.settings_group)
        .map(|g| DashboardGroup {
            title: g.title,
            links: g
                .links
                .unwrap_or_default()
                .into_iter()
                .map(|l| DashboardLink {
                    icon: non_empty(l.imageurl.as_deref()).map(|name| format!("/uploads/{name}")),
                    notes: non_empty(l.notes.as_deref())
                        .map(sanitize::sanitize_html)
                        .filter(|n| !n.is_empty()),
                    href: sanitize::is_safe_href(&l.link).then(|| l.link.trim().to_string()),
                    title: l.title,
                    link: l.link,
                })
                .collect(),
        })
        .collect();

    DashboardView { background, groups }
}

/// Template environment for the dashboard page
#[derive(Debug)]
pub struct DashboardRenderer {
    env: Environment<'static>,
}

impl DashboardRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("../../templates/dashboard.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &DashboardView) -> Result<String, minijinja::Error> {
        self.env.get_template(TEMPLATE_NAME)?.render(context! {
            background => &view.background,
            groups => &view.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::links::LinkResponse;

    fn link(id: i32, group_id: i32, title: &str, url: &str) -> LinkResponse {
        LinkResponse {
            id,
            group_id: Some(group_id),
            title: title.to_string(),
            link: url.to_string(),
            imageurl: None,
            notes: None,
            orderby: 0,
        }
    }

    fn group(id: i32, title: &str, links: Vec<LinkResponse>) -> GroupResponse {
        GroupResponse {
            id,
            title: title.to_string(),
            orderby: id,
            links: Some(links),
        }
    }

    #[test]
    fn test_background_resolution_order() {
        let config = DashboardConfig::default();
        let mut background = link(9, 2, "Background Image", "https://images.example/sky.jpg");
        let groups = vec![group(1, "Apps", vec![]), group(2, "Settings", vec![background.clone()])];

        assert_eq!(resolve_background(Some("bg.jpg"), &groups, &config), "/uploads/bg.jpg");
        assert_eq!(resolve_background(Some("/static/bg.jpg"), &groups, &config), "/static/bg.jpg");
        assert_eq!(resolve_background(Some("  "), &groups, &config), "https://images.example/sky.jpg");
        assert_eq!(resolve_background(None, &groups, &config), "https://images.example/sky.jpg");

        background.link = String::new();
        background.imageurl = Some("171-sky.jpg".into());
        let groups = vec![group(2, "Settings", vec![background])];
        assert_eq!(resolve_background(None, &groups, &config), "/uploads/171-sky.jpg");

        assert_eq!(resolve_background(None, &[group(1, "Apps", vec![])], &config), "/background.jpg");
    }

    #[test]
    fn test_view_hides_settings_and_sanitises_notes() {
        let config = DashboardConfig::default();
        let mut mail = link(10, 1, "Mail", "https://mail.example");
        mail.imageurl = Some("171-mail.png".into());
        mail.notes = Some("<p onclick=\"x()\">Inbox<script>bad()</script></p>".into());
        let mut empty_notes = link(11, 1, "Calendar", "https://cal.example");
        empty_notes.notes = Some("<script>only()</script>".into());
        let groups = vec![
            group(1, "Apps", vec![mail, empty_notes]),
            group(2, "Settings", vec![link(12, 2, "Background Image", "https://bg.example/a.jpg")]),
        ];

        let view = build_view(groups, None, &config);

        assert_eq!(view.background, "https://bg.example/a.jpg");
        assert_eq!(view.groups.len(), 1);
        let apps = &view.groups[0];
        assert_eq!(apps.title, "Apps");
        assert_eq!(apps.links[0].icon.as_deref(), Some("/uploads/171-mail.png"));
        assert_eq!(apps.links[0].notes.as_deref(), Some("<p>Inbox</p>"));
        assert_eq!(apps.links[1].icon, None);
        assert_eq!(apps.links[1].notes, None);
    }

    #[test]
    fn test_view_disarms_unsafe_link_schemes() {
        let config = DashboardConfig::default();
        let groups = vec![group(
            1,
            "Apps",
            vec![
                link(10, 1, "Mail", " https://mail.example "),
                link(11, 1, "Trap", "javascript:alert(1)"),
                link(12, 1, "Trap2", "JavaScript:alert(1)"),
                link(13, 1, "Data", "data:text/html,<b>x</b>"),
                link(14, 1, "Support", "mailto:help@example.com"),
            ],
        )];

        let view = build_view(groups, None, &config);
        let hrefs: Vec<Option<&str>> = view.groups[0].links.iter().map(|l| l.href.as_deref()).collect();
        assert_eq!(
            hrefs,
            vec![Some("https://mail.example"), None, None, None, Some("mailto:help@example.com")]
        );
        assert_eq!(view.groups[0].links[1].link, "javascript:alert(1)");
    }

    #[test]
    fn test_render_unsafe_link_without_anchor() {
        let renderer = DashboardRenderer::new().unwrap();
        let view = DashboardView {
            background: "/background.jpg".into(),
            groups: vec![DashboardGroup {
                title: "Apps".into(),
                links: vec![DashboardLink {
                    title: "Trap".into(),
                    link: "javascript:alert(1)".into(),
                    href: None,
                    icon: None,
                    notes: None,
                }],
            }],
        };

        let html = renderer.render(&view).unwrap();

        assert!(!html.contains("href=\"javascript"));
        assert!(html.contains("Trap"));
    }

    #[test]
    fn test_render_escapes_fields_but_not_notes() {
        let renderer = DashboardRenderer::new().unwrap();
        let view = DashboardView {
            background: "/uploads/bg.jpg".into(),
            groups: vec![DashboardGroup {
                title: "Apps & <Tools>".into(),
                links: vec![DashboardLink {
                    title: "Mail".into(),
                    link: "https://mail.example/?a=1&b=2".into(),
                    href: Some("https://mail.example/?a=1&b=2".into()),
                    icon: Some("/uploads/mail.png".into()),
                    notes: Some("<p><strong>Inbox</strong></p>".into()),
                }],
            }],
        };

        let html = renderer.render(&view).unwrap();

        assert!(html.contains("Apps &amp; &lt;Tools&gt;"));
        assert!(html.contains("<p><strong>Inbox</strong></p>"));
        assert!(html.contains("bg.jpg"));
        assert!(html.contains("mail.png"));
        assert!(!html.contains("<Tools>"));
    }
}
