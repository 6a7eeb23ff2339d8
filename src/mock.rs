//! Mock Streamly backend for testing the client without a real server.
//!
//! The mock binds an HTTP listener on a random localhost port and serves
//! canned JSON responses keyed by method and path. Every request it receives
//! is recorded, including its cookie header and body, so tests can assert
//! both what the client sent and that it sent nothing at all (for example,
//! a declined logout must not reach the network).
//!
//! ## Response queues
//! Responses registered for the same method and path form a queue: each
//! matching request consumes the next response, and the final response in
//! the queue is replayed indefinitely. That covers both "first call fails,
//! retry succeeds" sequences and pages that fetch the same resource many
//! times. Requests with no registered response get a 404 in the backend's
//! usual envelope shape.

use eyre::{Context, Result};
use http::Method;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, body};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request the mock backend received, as the client sent it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Contents of the `Cookie` header, if the client presented one.
    pub cookies: Option<String>,
    /// Contents of the `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Raw request body.
    pub body: Bytes,
    /// The body parsed as JSON, when it is JSON.
    pub json: Option<serde_json::Value>,
}

impl RecordedRequest {
    /// Convenience for asserting on JSON body fields in tests.
    pub fn json_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.json.as_ref().and_then(|v| v.get(key))
    }
}

/// A canned response to serve for one matching request.
#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: serde_json::Value,
    set_cookie: Option<String>,
}

type RouteKey = (String, String);

/// A mock Streamly backend for testing the client.
///
/// Serves whatever [`MockBackend::on`] registered and records every request
/// for later inspection with [`MockBackend::requests`].
#[derive(Debug, Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<RouteKey, VecDeque<CannedResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    /// Starts a mock backend on a random localhost port.
    ///
    /// The listener task runs until the surrounding runtime shuts down;
    /// tests do not need to stop it explicitly.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock Streamly backend")?;
        let addr = listener
            .local_addr()
            .context("get mock Streamly backend address")?;

        let routes: Arc<Mutex<HashMap<RouteKey, VecDeque<CannedResponse>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        {
            let routes = Arc::clone(&routes);
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                loop {
                    let Ok((conn, _)) = listener.accept().await else {
                        break;
                    };
                    let conn = hyper_util::rt::TokioIo::new(conn);
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<body::Incoming>| {
                            let routes = Arc::clone(&routes);
                            let requests = Arc::clone(&requests);
                            async move {
                                Ok::<_, std::convert::Infallible>(
                                    handle_request(routes, requests, req).await,
                                )
                            }
                        });
                        if let Err(e) = hyper::server::conn::http1::Builder::new()
                            .serve_connection(conn, service)
                            .await
                        {
                            tracing::debug!("mock backend connection ended: {e}");
                        }
                    });
                }
            });
        }

        tracing::debug!(%addr, "mock Streamly backend listening");
        Ok(Self {
            addr,
            routes,
            requests,
        })
    }

    /// Returns the base URL clients should be pointed at.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Registers a canned JSON response for the given method and path.
    ///
    /// May be called repeatedly for the same route to build a response
    /// sequence; see the module docs for queue semantics.
    pub async fn on(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        response_body: serde_json::Value,
    ) {
        self.register(method, path, status, response_body, None).await;
    }

    /// Like [`Self::on`], but the response also carries a `Set-Cookie`
    /// header, the way the real backend's login endpoint issues its session
    /// cookie.
    pub async fn on_with_cookie(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        response_body: serde_json::Value,
        set_cookie: impl Into<String>,
    ) {
        self.register(method, path, status, response_body, Some(set_cookie.into()))
            .await;
    }

    async fn register(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        response_body: serde_json::Value,
        set_cookie: Option<String>,
    ) {
        let key = (method.as_str().to_string(), path.into());
        self.routes
            .lock()
            .await
            .entry(key)
            .or_default()
            .push_back(CannedResponse {
                status,
                body: response_body,
                set_cookie,
            });
    }

    /// Returns every request received so far, in arrival order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// Returns the requests that hit the given path, in arrival order.
    pub async fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Clears the recorded request log.
    pub async fn clear_requests(&self) {
        self.requests.lock().await.clear();
    }
}

/// Records one inbound request and produces its canned (or 404) response.
async fn handle_request(
    routes: Arc<Mutex<HashMap<RouteKey, VecDeque<CannedResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    req: Request<body::Incoming>,
) -> Response<Full<Bytes>> {
    let (parts, req_body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(String::from);
    let cookies = parts
        .headers
        .get(hyper::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let content_type = parts
        .headers
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body_bytes = req_body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let json = serde_json::from_slice(&body_bytes).ok();

    tracing::trace!(method = %parts.method, path, "mock backend received request");

    requests.lock().await.push(RecordedRequest {
        method: parts.method.clone(),
        path: path.clone(),
        query,
        cookies,
        content_type,
        body: body_bytes,
        json,
    });

    let key = (parts.method.as_str().to_string(), path.clone());
    let canned = {
        let mut routes = routes.lock().await;
        match routes.get_mut(&key) {
            // Consume from the front, but keep replaying the final response.
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    match canned {
        Some(canned) => {
            let status = StatusCode::from_u16(canned.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut builder = Response::builder()
                .status(status)
                .header("Content-Type", "application/json");
            if let Some(cookie) = canned.set_cookie {
                builder = builder.header("Set-Cookie", cookie);
            }
            builder
                .body(Full::from(canned.body.to_string()))
                .unwrap_or_else(|_| Response::new(Full::from("{}")))
        }
        None => {
            tracing::debug!(method = %parts.method, path, "mock backend has no handler");
            let envelope = serde_json::json!({
                "statusCode": 404,
                "data": null,
                "message": format!("mock backend: no handler for {} {}", parts.method, path),
                "success": false,
            });
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "application/json")
                .body(Full::from(envelope.to_string()))
                .unwrap_or_else(|_| Response::new(Full::from("{}")))
        }
    }
}
