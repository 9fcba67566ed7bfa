//! HTTP client for a running HyperSpace server.
//!
//! [`HttpDashboardClient`] implements [`DashboardApi`] over the public REST endpoints, which is
//! how the `export`, `import` and `move-*` subcommands drive an editor session.

use crate::api::models::{
    configurations::ConfigurationResponse,
    groups::{GroupCreate, GroupResponse, GroupUpdate},
    links::{LinkCreate, LinkResponse, LinkUpdate},
    uploads::UploadResponse,
};
use crate::config::ClientConfig;
use crate::editor::{DashboardApi, SyncError};
use crate::types::{ConfigurationId, GroupId, LinkId};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, multipart};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Clone)]
pub struct HttpDashboardClient {
    client: Client,
    base_url: Url,
}

impl HttpDashboardClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        // reqwest is built without a default provider; the binary installs one at startup and
        // a second install is a no-op error, so library callers get one here.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| SyncError::Decode(format!("api_url '{}': {}", config.api_url, e)))?;
        Self::new(base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Decode(format!("base URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Sending request");
        Ok(self.client.request(method, url))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str, id: &str) -> Result<T> {
        let response = check(request.send().await?, resource, id).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SyncError::Decode(format!("{resource} response: {e}")))
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        resource: &str,
    ) -> Result<T> {
        let id = segments.get(1).copied().unwrap_or_default();
        let request = self.request(method, segments)?.json(body);
        self.json(request, resource, id).await
    }

    async fn delete(&self, segments: &[&str], resource: &str) -> Result<()> {
        let id = segments.get(1).copied().unwrap_or_default();
        check(self.request(Method::DELETE, segments)?.send().await?, resource, id).await?;
        Ok(())
    }
}

/// Turn a non-success response into the matching [`SyncError`]
async fn check(response: Response, resource: &str, id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(SyncError::not_found(resource, id));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(SyncError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DashboardApi for HttpDashboardClient {
    #[instrument(skip_all)]
    async fn list_tree(&mut self) -> Result<Vec<GroupResponse>> {
        let request = self.request(Method::GET, &["groups"])?;
        self.json(request, "Groups", "").await
    }

    #[instrument(skip_all)]
    async fn create_group(&mut self, request: &GroupCreate) -> Result<GroupResponse> {
        self.send_json(Method::POST, &["groups"], request, "Group").await
    }

    #[instrument(skip(self, request))]
    async fn update_group(&mut self, id: GroupId, request: &GroupUpdate) -> Result<GroupResponse> {
        self.send_json(Method::PUT, &["groups", &id.to_string()], request, "Group").await
    }

    #[instrument(skip(self))]
    async fn delete_group(&mut self, id: GroupId) -> Result<()> {
        self.delete(&["groups", &id.to_string()], "Group").await
    }

    #[instrument(skip_all)]
    async fn list_links(&mut self) -> Result<Vec<LinkResponse>> {
        let request = self.request(Method::GET, &["links"])?;
        self.json(request, "Links", "").await
    }

    #[instrument(skip_all)]
    async fn create_link(&mut self, request: &LinkCreate) -> Result<LinkResponse> {
        self.send_json(Method::POST, &["links"], request, "Link").await
    }

    #[instrument(skip(self, request))]
    async fn update_link(&mut self, id: LinkId, request: &LinkUpdate) -> Result<LinkResponse> {
        self.send_json(Method::PUT, &["links", &id.to_string()], request, "Link").await
    }

    #[instrument(skip(self))]
    async fn delete_link(&mut self, id: LinkId) -> Result<()> {
        self.delete(&["links", &id.to_string()], "Link").await
    }

    #[instrument(skip_all)]
    async fn list_configurations(&mut self) -> Result<Vec<ConfigurationResponse>> {
        let request = self.request(Method::GET, &["configurations"])?;
        self.json(request, "Configurations", "").await
    }

    #[instrument(skip(self))]
    async fn delete_configuration(&mut self, id: ConfigurationId) -> Result<()> {
        self.delete(&["configurations", &id.to_string()], "Configuration").await
    }

    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn upload_image(&mut self, name: &str, content: Vec<u8>) -> Result<String> {
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let part = multipart::Part::bytes(content).file_name(name.to_string()).mime_str(mime.as_ref())?;
        let form = multipart::Form::new().part("file", part);

        let request = self.request(Method::POST, &["upload"])?.multipart(form);
        let uploaded: UploadResponse = self.json(request, "Upload", name).await?;
        Ok(uploaded.file.filename)
    }

    #[instrument(skip(self))]
    async fn fetch_image(&mut self, name: &str) -> Result<Vec<u8>> {
        let response = self.request(Method::GET, &["uploads", name])?.send().await?;
        let response = check(response, "Image", name).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
