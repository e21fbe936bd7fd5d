//! Reqwest-backed comics gateway adapter.
//!
//! This adapter owns transport details only: endpoint construction, header
//! rendering, the per-attempt timeout, and transport error mapping. Status
//! interpretation belongs to the domain ladder, so every completed exchange
//! is returned as data regardless of its status code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use url::Url;

use crate::domain::ports::{
    BackendMethod, BackendRequest, BackendResponse, ComicsGateway, ComicsGatewayError,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "comic-admin-client/0.1";

/// Outbound identity settings for backend requests.
pub struct GatewayIdentity {
    /// HTTP user-agent sent with every request.
    pub user_agent: String,
}

impl Default for GatewayIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Gateway adapter performing HTTP exchanges against one API base URL.
pub struct HttpComicsGateway {
    client: Client,
    base: Url,
    user_agent: String,
}

impl HttpComicsGateway {
    /// Build an adapter with the default timeout and identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_identity(base, DEFAULT_TIMEOUT, GatewayIdentity::default())
    }

    /// Build an adapter with an explicit per-attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(base, timeout, GatewayIdentity::default())
    }

    /// Build an adapter with explicit timeout and outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base: Url,
        timeout: Duration,
        identity: GatewayIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
            user_agent: identity.user_agent,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ComicsGatewayError> {
        self.base.join(path).map_err(|error| {
            ComicsGatewayError::invalid_request(format!("cannot build endpoint for {path}: {error}"))
        })
    }
}

#[async_trait]
impl ComicsGateway for HttpComicsGateway {
    async fn send(&self, request: &BackendRequest) -> Result<BackendResponse, ComicsGatewayError> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self
            .client
            .request(method_for(request.method), url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(auth) = &request.auth {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth.header_value());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_transport_error)?;
        Ok(BackendResponse { status, body })
    }
}

fn method_for(method: BackendMethod) -> Method {
    match method {
        BackendMethod::Get => Method::GET,
        BackendMethod::Post => Method::POST,
        BackendMethod::Put => Method::PUT,
        BackendMethod::Patch => Method::PATCH,
    }
}

/// Relative joins drop the base's last path segment unless it ends in `/`.
fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let padded = format!("{}/", base.path());
        base.set_path(&padded);
    }
    base
}

fn map_transport_error(error: reqwest::Error) -> ComicsGatewayError {
    if error.is_timeout() {
        ComicsGatewayError::timeout(error.to_string())
    } else {
        ComicsGatewayError::transport(error.to_string())
    }
}
