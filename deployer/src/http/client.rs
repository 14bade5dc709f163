//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::DeployError;

/// Socket level timeouts.
///
/// Nothing bounds a whole request, so an archive upload may run as long as
/// bytes keep moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Limit for establishing a connection
    pub connect: Duration,

    /// Limit for a single read to make progress
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read: Duration::from_secs(300),
        }
    }
}

/// HTTP client for deploy service communication
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        timeouts: Timeouts,
    ) -> Result<Self, DeployError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()?;
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            DeployError::ConfigError(format!("Invalid backend URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DeployError::ConfigError(format!(
                "Invalid backend URL {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    async fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Response, DeployError> {
        debug!("{} {}", method, url);
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(Self::failure(method, url, response).await);
        }
        Ok(response)
    }

    async fn failure(method: &str, url: &Url, response: Response) -> DeployError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("HTTP {} {} failed: {} - {}", method, url, status, body);
        let message = serde_json::from_str::<openapi_client::ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        DeployError::Backend(format!("{}: {}", status, message))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, DeployError> {
        let request = self.client.get(url.clone()).query(query);
        let response = self.send("GET", &url, request).await?;
        Ok(response.json().await?)
    }

    /// Make a GET request, mapping 404 to `None`
    pub async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, DeployError> {
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(url.clone())).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure("GET", &url, response).await);
        }
        Ok(Some(response.json().await?))
    }

    /// Make a GET request for a raw body, left undecoded
    pub async fn get_bytes(&self, url: Url, query: &[(&str, &str)]) -> Result<Vec<u8>, DeployError> {
        let request = self.client.get(url.clone()).query(query);
        let response = self.send("GET", &url, request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, DeployError> {
        let request = self.client.post(url.clone()).json(body);
        let response = self.send("POST", &url, request).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request without a body, ignoring the response content
    pub async fn post_empty(&self, url: Url) -> Result<(), DeployError> {
        let request = self.client.post(url.clone());
        self.send("POST", &url, request).await?;
        Ok(())
    }

    /// Make a multipart POST request
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, DeployError> {
        let request = self.client.post(url.clone()).multipart(form);
        let response = self.send("POST", &url, request).await?;
        Ok(response.json().await?)
    }
}
