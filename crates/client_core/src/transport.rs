//! HTTP access to the repository backend.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{CapabilitiesSummary, DescriptionId, DeviceDescription, StatusSnapshot},
    error::ServerErrorPayload,
    protocol::{CAPABILITIES_PATH, DEVICE_DESCRIPTIONS_PATH, EXAMPLE_PATH, STATUS_PATH},
};
use tracing::debug;
use url::Url;

use crate::error::RequestFailure;

#[async_trait]
pub trait RepositoryApi: Send + Sync {
    async fn list_descriptions(&self) -> Result<Vec<DeviceDescription>, RequestFailure>;
    async fn fetch_example(&self) -> Result<Value, RequestFailure>;
    async fn fetch_status(&self) -> Result<StatusSnapshot, RequestFailure>;
    /// Submits `body` verbatim; the server validates it.
    async fn create_description(&self, body: String) -> Result<DeviceDescription, RequestFailure>;
    async fn delete_description(&self, id: &DescriptionId) -> Result<(), RequestFailure>;
    async fn clear_repository(&self) -> Result<(), RequestFailure>;
    async fn fetch_capabilities(&self) -> Result<CapabilitiesSummary, RequestFailure>;
}

pub struct HttpRepositoryApi {
    http: Client,
    base_url: Url,
}

impl HttpRepositoryApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("invalid repository url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("repository url '{base_url}' cannot carry a path");
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestFailure> {
        self.base_url
            .join(path)
            .map_err(|err| RequestFailure::Transport(format!("invalid endpoint '{path}': {err}")))
    }

    fn description_url(&self, id: &DescriptionId) -> Result<Url, RequestFailure> {
        let mut url = self.endpoint(DEVICE_DESCRIPTIONS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| RequestFailure::Transport("repository url cannot carry a path".into()))?
            .push(&id.to_string());
        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, RequestFailure> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| RequestFailure::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // A body that cannot be read counts as no body.
        let body = match response.bytes().await {
            Ok(bytes) => ServerErrorPayload::from_body(&bytes),
            Err(_) => None,
        };
        Err(RequestFailure::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RequestFailure> {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| RequestFailure::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| RequestFailure::Decode(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestFailure> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.execute(self.http.get(url)).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl RepositoryApi for HttpRepositoryApi {
    async fn list_descriptions(&self) -> Result<Vec<DeviceDescription>, RequestFailure> {
        self.get_json(DEVICE_DESCRIPTIONS_PATH).await
    }

    async fn fetch_example(&self) -> Result<Value, RequestFailure> {
        self.get_json(EXAMPLE_PATH).await
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, RequestFailure> {
        self.get_json(STATUS_PATH).await
    }

    async fn create_description(&self, body: String) -> Result<DeviceDescription, RequestFailure> {
        let url = self.endpoint(DEVICE_DESCRIPTIONS_PATH)?;
        debug!(%url, bytes = body.len(), "POST");
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json;charset=utf-8")
            .body(body);
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    async fn delete_description(&self, id: &DescriptionId) -> Result<(), RequestFailure> {
        let url = self.description_url(id)?;
        debug!(%url, "DELETE");
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn clear_repository(&self) -> Result<(), RequestFailure> {
        let url = self.endpoint(DEVICE_DESCRIPTIONS_PATH)?;
        debug!(%url, "DELETE");
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn fetch_capabilities(&self) -> Result<CapabilitiesSummary, RequestFailure> {
        self.get_json(CAPABILITIES_PATH).await
    }
}
