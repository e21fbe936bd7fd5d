//! Driven port for the comic platform's REST surface.
//!
//! The gateway transports exactly one request and reports the status line
//! and body without interpreting either; non-2xx statuses are data for the
//! ladder, not errors. Only transport-level failures surface as errors.

use async_trait::async_trait;
use serde_json::Value;

/// HTTP method used for one backend attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMethod {
    /// Aggregate fetch.
    Get,
    /// Mutation probe or fallback write.
    Post,
    /// Mutation probe or aggregate rewrite.
    Put,
    /// Preferred mutation verb.
    Patch,
}

impl BackendMethod {
    /// Uppercase method name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

/// Authorization header convention for one attempt.
///
/// Deployments disagree on whether the header value carries a `Bearer`
/// scheme prefix; the ladder decides which convention each attempt uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthHeader {
    /// `Authorization: Bearer {token}`.
    Bearer(String),
    /// `Authorization: {token}` with no scheme prefix.
    Raw(String),
}

impl AuthHeader {
    /// Header value to send.
    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Raw(token) => token.clone(),
        }
    }
}

/// One request against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    /// HTTP method.
    pub method: BackendMethod,
    /// Path relative to the API base, without a leading slash.
    pub path: String,
    /// Authorization header, when credentials are available.
    pub auth: Option<AuthHeader>,
    /// JSON body, when the method carries one.
    pub body: Option<Value>,
}

/// Status line and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body text; may be empty.
    pub body: String,
}

impl BackendResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors surfaced while transporting a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComicsGatewayError {
    /// Transport failed before a response arrived.
    #[error("comics backend transport failed: {message}")]
    Transport {
        /// Transport diagnostic.
        message: String,
    },
    /// The per-attempt timeout elapsed.
    #[error("comics backend timed out: {message}")]
    Timeout {
        /// Timeout diagnostic.
        message: String,
    },
    /// Adapter rejected the request before execution.
    #[error("comics backend request invalid: {message}")]
    InvalidRequest {
        /// Validation diagnostic.
        message: String,
    },
}

impl ComicsGatewayError {
    /// Transport-failure constructor.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Timeout constructor.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Pre-execution rejection constructor.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Port for exchanging one request with the comic backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComicsGateway: Send + Sync {
    /// Execute one exchange and report its outcome.
    ///
    /// # Examples
    /// ```
    /// use admin_client::domain::ports::{
    ///     BackendMethod, BackendRequest, ComicsGateway, FixtureComicsGateway,
    /// };
    ///
    /// # async fn demo() -> Result<(), admin_client::domain::ports::ComicsGatewayError> {
    /// let gateway = FixtureComicsGateway;
    /// let response = gateway
    ///     .send(&BackendRequest {
    ///         method: BackendMethod::Get,
    ///         path: "comics/c1".to_owned(),
    ///         auth: None,
    ///         body: None,
    ///     })
    ///     .await?;
    /// assert!(response.is_success());
    /// # Ok(())
    /// # }
    /// ```
    async fn send(&self, request: &BackendRequest) -> Result<BackendResponse, ComicsGatewayError>;
}

/// Fixture implementation answering every request with an empty 200.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureComicsGateway;

#[async_trait]
impl ComicsGateway for FixtureComicsGateway {
    async fn send(&self, _request: &BackendRequest) -> Result<BackendResponse, ComicsGatewayError> {
        Ok(BackendResponse {
            status: 200,
            body: String::new(),
        })
    }
}
