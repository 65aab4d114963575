//! REST collaborator client for SenseLib over reqwest.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderValue, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::{NoContext, Timestamp, Uuid};

use senselib_kernel::settings::ApiSettings;
use senselib_kernel::{ApiError, Collaborator, Entity, Id, ListQuery, Page};

pub mod endpoint;
pub mod error;

use endpoint::EndpointBuilder;

pub use reqwest::Method;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// File part for multipart uploads.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Shared HTTP client for every collaborator endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Create a configured client from API settings
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> EndpointBuilder {
        EndpointBuilder::new(&self.base_url)
    }

    /// Typed collaborator for one resource.
    pub fn collaborator<E: Entity>(&self, resource: &str) -> RestCollaborator<E> {
        RestCollaborator::new(self.clone(), resource)
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.dispatch(request).await?;
        response.json::<T>().await.map_err(error::transport)
    }

    /// Send a request whose success body is ignored.
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.dispatch(request).await?;
        Ok(())
    }

    /// POST a single file as multipart form data.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        url: &str,
        field: &str,
        file: UploadFile,
    ) -> Result<T, ApiError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|e| ApiError::bad_request(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        self.send_json(self.request(Method::POST, url).multipart(form))
            .await
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v7(Timestamp::now(NoContext));
        let header = HeaderValue::from_str(&request_id.to_string())
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid request id: {e}")))?;

        let response = request
            .header(REQUEST_ID_HEADER, header)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%request_id, error = %e, "collaborator unreachable");
                error::transport(e)
            })?;

        let status = response.status();
        tracing::debug!(
            %request_id,
            status_code = %status.as_u16(),
            url = %response.url(),
            "collaborator responded"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error::decode_error(status, &body))
    }
}

/// [`Collaborator`] backed by the conventional REST endpoints of one resource.
pub struct RestCollaborator<E> {
    client: RestClient,
    resource: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RestCollaborator<E> {
    pub fn new(client: RestClient, resource: &str) -> Self {
        Self {
            client,
            resource: resource.to_string(),
            _entity: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        self.client.endpoint().resource(&self.resource).build()
    }

    fn item_url(&self, id: Id) -> EndpointBuilder {
        self.client.endpoint().resource(&self.resource).item(id)
    }
}

#[async_trait]
impl<E: Entity> Collaborator<E> for RestCollaborator<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ApiError> {
        let request = self
            .client
            .request(Method::GET, &self.collection_url())
            .query(query);
        self.client.send_json(request).await
    }

    async fn get(&self, id: Id) -> Result<E, ApiError> {
        let url = self.item_url(id).build();
        self.client
            .send_json(self.client.request(Method::GET, &url))
            .await
    }

    async fn create(&self, payload: &Value) -> Result<E, ApiError> {
        let request = self
            .client
            .request(Method::POST, &self.collection_url())
            .json(payload);
        self.client.send_json(request).await
    }

    async fn update(&self, id: Id, payload: &Value) -> Result<E, ApiError> {
        let url = self.item_url(id).build();
        let request = self.client.request(Method::PUT, &url).json(payload);
        self.client.send_json(request).await
    }

    async fn toggle_active(&self, id: Id) -> Result<E, ApiError> {
        let url = self.item_url(id).segment("toggle-active").build();
        self.client
            .send_json(self.client.request(Method::PATCH, &url))
            .await
    }

    async fn delete(&self, id: Id) -> Result<(), ApiError> {
        let url = self.item_url(id).build();
        self.client
            .send_empty(self.client.request(Method::DELETE, &url))
            .await
    }
}
