//! Reqwest-based HTTP client for the Care Connect backend.

use std::sync::Arc;
use std::time::Instant;

use careconnect_core::backend::CallContext;
use careconnect_core::{BackendService, SessionGate};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{Error, ReqwestConfig, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "careconnect_reqwest::client";

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    base_url: Url,
    config: ReqwestConfig,
}

/// Reqwest-based HTTP client for the Care Connect REST backend.
///
/// Implements [`BackendProvider`] by speaking JSON to the backend and
/// attaching the call's credential as a bearer token.
///
/// [`BackendProvider`]: careconnect_core::BackendProvider
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new reqwest client with the given configuration.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %base_url,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()?;

        let inner = ReqwestClientInner {
            http,
            base_url,
            config,
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Reqwest client created successfully"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Converts this client into a [`BackendService`] reporting to `gate`.
    pub fn into_service(self, gate: SessionGate) -> BackendService {
        BackendService::new(self, gate)
    }

    /// Resolves an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Builds a request for `path`, attaching the call's credential.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        context: &CallContext,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let request = self.inner.http.request(method, url);

        Ok(match context.credential.as_deref() {
            Some(credential) => request.bearer_auth(credential),
            None => request,
        })
    }

    /// Sends `body` as JSON and decodes the JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        context: &CallContext,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method.clone(), path, context)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let started_at = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Backend responded"
        );

        check_status(status, &bytes)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Maps a non-success status to an error, keeping the backend's message.
pub(crate) fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }

    if !status.is_success() {
        return Err(Error::Status {
            status,
            message: backend_message(body),
        });
    }

    Ok(())
}

/// Extracts `msg` (or `message`) from an error body.
fn backend_message(body: &[u8]) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(alias = "message")]
        msg: Option<String>,
    }

    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.msg)
        .filter(|msg| !msg.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> ReqwestClient {
        ReqwestClient::new(ReqwestConfig::new(api_url)).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client("http://localhost:5000");
        assert!(client.config().user_agent.is_none());
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(ReqwestClient::new(ReqwestConfig::new("nope")).is_err());
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = client("https://example.com/care");
        assert_eq!(
            client.endpoint("/api/auth/signin").unwrap().as_str(),
            "https://example.com/care/api/auth/signin"
        );
    }

    #[test]
    fn test_request_attaches_bearer() {
        let client = client("http://localhost:5000");
        let request = client
            .request(
                Method::GET,
                "api/doctor/all",
                &CallContext::with_credential("abc"),
            )
            .unwrap()
            .build()
            .unwrap();

        let header = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_anonymous_request_has_no_authorization() {
        let client = client("http://localhost:5000");
        let request = client
            .request(Method::POST, "api/auth/signin", &CallContext::anonymous())
            .unwrap()
            .build()
            .unwrap();

        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK, b"").is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, b""),
            Err(Error::Unauthorized)
        ));

        let Err(Error::Status { status, message }) =
            check_status(StatusCode::BAD_REQUEST, br#"{"error":true,"msg":"Bad date"}"#)
        else {
            panic!("expected status error");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message.as_deref(), Some("Bad date"));
    }

    #[test]
    fn test_check_status_ignores_non_json_body() {
        let Err(Error::Status { message, .. }) =
            check_status(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>")
        else {
            panic!("expected status error");
        };
        assert_eq!(message, None);
    }
}
