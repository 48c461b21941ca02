//! Request dispatcher for the Appetit REST API.
//!
//! Every endpoint wrapper funnels through [`ApiClient::dispatch`]:
//!
//! - the endpoint path is appended to the configured base URL
//! - an object or array body is sent as JSON, a string body verbatim
//! - `Authorization: Bearer <token>` is attached only when a session is given
//! - a non-success status becomes [`ClientError::Api`] carrying the body's
//!   `detail` field, or `HTTP <status>` when there is none
//!
//! The dispatcher keeps no per-call state, so one client can serve any number
//! of concurrent calls.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::Session;

/// One HTTP call to make.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl Request {
    /// Create a request with the given method and endpoint path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query pair.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query pair only when `value` is present.
    #[must_use]
    pub fn with_optional_query<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Attach a raw body. `null` clears it.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = (!body.is_null()).then_some(body);
        self
    }

    /// Attach a serializable body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Encode` if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body).map_err(ClientError::Encode)?;
        Ok(self.with_body(value))
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Resolve the full URL against `base`.
    fn url(&self, base: &str) -> Result<Url, ClientError> {
        if self.path.is_empty() || !self.path.starts_with('/') {
            return Err(ClientError::InvalidEndpoint(self.path.clone()));
        }

        let mut url = Url::parse(&format!("{base}{}", self.path))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Wire form of a request body.
#[derive(Debug, PartialEq, Eq)]
enum EncodedBody {
    Json(Vec<u8>),
    Text(String),
}

fn encode_body(body: &Value) -> Result<Option<EncodedBody>, ClientError> {
    Ok(match body {
        Value::Null => None,
        Value::String(s) => Some(EncodedBody::Text(s.clone())),
        Value::Object(_) | Value::Array(_) => Some(EncodedBody::Json(
            serde_json::to_vec(body).map_err(ClientError::Encode)?,
        )),
        Value::Bool(_) | Value::Number(_) => Some(EncodedBody::Text(body.to_string())),
    })
}

/// Decode a response body, treating an empty body as `null`.
fn decode_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

/// Pull the user-facing message out of an error response body.
fn error_detail(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// HTTP client for the Appetit API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base: config.api_base.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Base URL every endpoint is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    /// Send `request` and return the decoded JSON body unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidEndpoint` / `InvalidUrl` if the URL cannot be formed
    /// - `Transport` if the exchange does not complete
    /// - `Api` for any non-success status
    /// - `Decode` if a success body is not JSON
    #[instrument(
        skip(self, session, request),
        fields(method = %request.method, path = %request.path, authenticated = session.is_some())
    )]
    pub async fn dispatch(
        &self,
        session: Option<&Session>,
        request: Request,
    ) -> Result<Value, ClientError> {
        let url = request.url(&self.inner.base)?;
        let mut builder = self.inner.client.request(request.method.clone(), url);

        if let Some(session) = session {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", session.token()))
                .map_err(|_| ClientError::InvalidToken)?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(body) = &request.body {
            builder = match encode_body(body)? {
                Some(EncodedBody::Json(bytes)) => builder
                    .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .body(bytes),
                Some(EncodedBody::Text(text)) => builder.body(text),
                None => builder,
            };
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(status = status.as_u16(), bytes = bytes.len(), "Response received");

        if !status.is_success() {
            return Err(ClientError::api(status.as_u16(), error_detail(&bytes)));
        }

        Ok(decode_body(&bytes)?)
    }

    /// Send `request` and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`dispatch`](Self::dispatch) returns, plus `Decode` when the
    /// body does not match `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        session: Option<&Session>,
        request: Request,
    ) -> Result<T, ClientError> {
        let value = self.dispatch(session, request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .finish_non_exhaustive()
    }
}
