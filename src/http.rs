//! Shared HTTP transport for talking to the Streamly backend.
//!
//! Every other component in this crate issues its requests through a single
//! [`ApiClient`] configured once at startup with the backend base address.
//! Credentials are never attached per call: the backend uses session cookies,
//! and the client's persistent cookie store carries them on every request
//! automatically after a successful login.
//!
//! All responses pass through one observation point before being handed back
//! to the caller. Non-success statuses are turned into errors carrying the
//! method, status, and the backend's failure message; an unauthorized status
//! additionally logs a diagnostic warning. The observer never swallows or
//! rewrites a failure, and it never forces a logout itself. Deciding what an
//! authorization failure means is left to the caller (in practice, the
//! session store).

use eyre::Context;
use http::Method;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::instrument;

/// Environment variable naming the backend instance to talk to.
pub const BASE_URL_ENV: &str = "STREAMLY_API_URL";

/// Base address used when [`BASE_URL_ENV`] is not set.
///
/// Matches the backend's default development listen address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// HTTP client for the Streamly REST API.
///
/// Wraps a [`reqwest::Client`] with a persistent in-memory cookie store so
/// that the session cookie issued by `POST /users/login` rides along on every
/// subsequent request without explicit handling. Cloning is cheap and clones
/// share the same cookie store, so a client handed to several components
/// still represents one browser-like session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Backend base address, without a trailing slash.
    base_url: String,
    /// HTTP client carrying the session cookie jar.
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given backend base address.
    ///
    /// The address is read once here; there is no support for re-pointing an
    /// existing client at a different backend.
    pub fn new(base_url: impl Into<String>) -> eyre::Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("build HTTP client with cookie store")?;

        Ok(Self { base_url, client })
    }

    /// Creates a client from the `STREAMLY_API_URL` environment variable,
    /// falling back to [`DEFAULT_BASE_URL`] when unset.
    pub fn from_env() -> eyre::Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Returns the backend base address this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Makes an HTTP request to the Streamly API with common error handling.
    ///
    /// This method consolidates the shared logic across all API requests:
    /// - URL construction from the configured base address
    /// - Query parameters (for both GET and POST requests)
    /// - JSON body (for requests that need one)
    /// - Response observation and status validation
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method to use (GET, POST, PATCH, DELETE)
    /// * `path` - The API route, starting with `/` (e.g. `/users/login`)
    /// * `query_params` - Optional query parameters
    /// * `json_body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// The raw [`reqwest::Response`] for endpoint-specific JSON parsing.
    #[instrument(skip(self, json_body), ret, level = tracing::Level::TRACE)]
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query_params: Option<&[(&str, &str)]>,
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method.clone(), &url);

        // Add query parameters if provided
        if let Some(params) = query_params {
            request = request.query(params);
        }

        // Add JSON body and content-type if provided
        if let Some(body) = json_body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {} request to Streamly API: {}", method, url))?;

        self.observe(&method, path, response).await
    }

    /// Makes a multipart/form-data request, used by the upload-style endpoints
    /// (register, avatar and cover image updates, video publish).
    ///
    /// Goes through the same response observation as [`Self::request`].
    #[instrument(skip(self, form), ret, level = tracing::Level::TRACE)]
    pub(crate) async fn request_multipart(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> eyre::Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .request(method.clone(), &url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("send {} multipart request to Streamly API: {}", method, url))?;

        self.observe(&method, path, response).await
    }

    /// Inspects an inbound response before it reaches the caller.
    ///
    /// Success passes straight through. Any other status becomes an error
    /// carrying the backend's `message` field when the body parses as the
    /// standard envelope, or the raw body text otherwise. An unauthorized
    /// response is logged before the error is raised, but the error itself is
    /// the same one any non-success status produces: observation never
    /// changes what the caller sees.
    async fn observe(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> eyre::Result<reqwest::Response> {
        let status_code = response.status();
        if !status_code.is_success() {
            if status_code == StatusCode::UNAUTHORIZED {
                tracing::warn!(%method, path, "unauthorized response, session may have expired");
            }

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            // The backend wraps failures in its usual envelope; prefer its
            // message field over the raw body when present.
            let error_text = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(error_text);
            return Err(eyre::eyre!(
                "Streamly API {} {} failed with status {}: {}",
                method,
                path,
                status_code,
                error_text
            ));
        }

        Ok(response)
    }
}
