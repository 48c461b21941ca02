//! Integration tests for the Appetit client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p appetit-integration-tests
//! ```
//!
//! No backend is needed. Each test starts a [`FixtureApi`] on a random
//! local port, scripts the replies it needs, and inspects the requests the
//! client actually sent.
//!
//! # Test Categories
//!
//! - `dispatcher` - Bearer header, success bodies, error messages
//! - `notifications` - One danger notice per failed call
//! - `session_flow` - Login persistence and logout
//! - `analytics_dashboard` - Concurrent reports and export
//! - `commerce` - Cart subtotal, promocode totals, test orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use appetit_client::{ApiClient, ClientConfig, ClientError};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use axum::http::Method;

/// Path prefix every fixture route lives under.
pub const API_PREFIX: &str = "/api/v1";

/// A request as the fixture server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    /// Path below [`API_PREFIX`].
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    /// Decoded JSON body, a JSON string for non-JSON text, `Null` when empty.
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct FixtureState {
    routes: HashMap<(Method, String), Reply>,
    requests: Mutex<Vec<Recorded>>,
}

/// Scripted replies for a [`FixtureApi`].
#[derive(Debug, Default)]
pub struct FixtureBuilder {
    routes: HashMap<(Method, String), Reply>,
}

impl FixtureBuilder {
    /// Answer `method path` with `status` and a JSON body.
    #[must_use]
    pub fn json(mut self, method: Method, path: &str, status: u16, body: &Value) -> Self {
        let reply = Reply {
            status: status_code(status),
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        };
        self.routes.insert((method, path.to_owned()), reply);
        self
    }

    /// Answer `method path` with `status` and a plain-text body.
    #[must_use]
    pub fn text(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        let reply = Reply {
            status: status_code(status),
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        };
        self.routes.insert((method, path.to_owned()), reply);
        self
    }

    /// Bind to a random local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(self) -> std::io::Result<FixtureApi> {
        let state = Arc::new(FixtureState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(FixtureApi {
            addr,
            state,
            server,
        })
    }
}

/// A local stand-in for the backend.
///
/// Unscripted routes answer 404 with `{"detail": "Not Found"}`.
#[derive(Debug)]
pub struct FixtureApi {
    addr: SocketAddr,
    state: Arc<FixtureState>,
    server: JoinHandle<()>,
}

impl FixtureApi {
    #[must_use]
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    /// Base URL to point the client at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client configuration aimed at this fixture.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base: self.base_url(),
            ..ClientConfig::default()
        }
    }

    /// A client aimed at this fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<ApiClient, ClientError> {
        ApiClient::new(&self.config())
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

impl Drop for FixtureApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<FixtureState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or_else(|| uri.path())
        .to_owned();
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    let recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: decode(&body),
    };
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    match state.routes.get(&(method, path)) {
        Some(reply) => (
            reply.status,
            [(CONTENT_TYPE, reply.content_type)],
            reply.body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "application/json")],
            json!({"detail": "Not Found"}).to_string(),
        )
            .into_response(),
    }
}

fn decode(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Base URL of a local port with nothing listening.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn unreachable_base_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}{API_PREFIX}"))
}

/// A fresh state file path for `test`, removed if it already exists.
#[must_use]
pub fn temp_state_file(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("appetit-it-{}-{test}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("state.json")
}
