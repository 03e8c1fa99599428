//! `fetch` and the reqwest-backed [`Transport`].
//!
//! # Examples
//!
//! ## Simple GET request
//!
//! ```no_run
//! use fetch_model::client::{fetch, ReqwestTransport};
//! use fetch_model::{Request, RequestInit};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new()?;
//!     let request = Request::new("http://example.com/api/data", RequestInit::default())?;
//!
//!     let mut response = fetch(&transport, request).await?;
//!     println!("Status: {}", response.status());
//!     println!("Body: {}", response.text().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Retrying idempotent requests
//!
//! ```no_run
//! use fetch_model::client::{ClientConfig, ReqwestTransport};
//!
//! let transport = ReqwestTransport::with_config(ClientConfig {
//!     max_retries: 3,
//!     retry_delay_ms: 200,
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

use super::config::ClientConfig;
use super::transport::{Transport, TransportRequest, TransportResponse};
use super::utils::{exponential_backoff, is_idempotent_method, is_retryable_status};
use crate::error::{FetchError, Result};
use crate::protocol::{constants::headers as header_names, status};
use crate::request::{Request, RequestMode, RequestRedirect};
use crate::response::{Response, ResponseType};
use crate::types::AbortSignal;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Send `request` through `transport` and build the [`Response`].
///
/// The request body is encoded first, so a consumed body fails with
/// [`FetchError::BodyAlreadyUsed`] before anything is sent. Requests in
/// `no-cors` mode produce opaque responses.
///
/// # Errors
///
/// - [`FetchError::Aborted`] when the request's signal has already fired
/// - any error returned by the transport
pub async fn fetch<T>(transport: &T, request: Request) -> Result<Response>
where
    T: Transport + ?Sized,
{
    if request.signal().is_some_and(AbortSignal::aborted) {
        return Err(FetchError::Aborted);
    }

    let response_type = match request.mode() {
        RequestMode::NoCors => ResponseType::Opaque,
        _ => ResponseType::Basic,
    };

    let (wire, signal) = request.into_transport().await?;
    let url = wire.url.clone();
    tracing::debug!(
        method = %wire.method,
        url = %url,
        body_len = wire.body.as_ref().map_or(0, |b| b.len()),
        "dispatching request"
    );

    let raw = transport.send(wire, signal).await?;
    tracing::debug!(status = raw.status, url = %url, "received response");

    Response::from_transport(raw, url, response_type)
}

/// [`Transport`] over a pair of `reqwest` clients.
///
/// Requests whose redirect mode is `follow` use a client that follows
/// redirects; `manual` and `error` use one that does not.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    following: reqwest::Client,
    manual: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] when the proxy URL is invalid or the TLS
    /// backend cannot be initialised.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let following = Self::builder(&config)?.build()?;
        let manual = Self::builder(&config)?
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(ReqwestTransport {
            following,
            manual,
            config: Arc::new(config),
        })
    }

    fn builder(config: &ClientConfig) -> Result<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host);

        if !config.proxy_url.is_empty() {
            builder = builder.proxy(reqwest::Proxy::all(&config.proxy_url)?);
        }
        Ok(builder)
    }

    /// Get the transport configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send with retry logic
    async fn send_with_retries(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let retryable_method = is_idempotent_method(&request.method);
        let mut attempt = 0;

        loop {
            let may_retry = retryable_method && attempt < self.config.max_retries;
            let delay = exponential_backoff(attempt, self.config.retry_delay_ms);

            match self.send_once(request).await {
                Ok(response) if may_retry && is_retryable_status(response.status) => {
                    if self.config.enable_logging {
                        tracing::warn!(
                            "Request to {} returned {} (attempt {}), retrying after {:?}",
                            request.url,
                            response.status,
                            attempt + 1,
                            delay
                        );
                    }
                }
                Err(e) if may_retry && e.is_retryable() => {
                    if self.config.enable_logging {
                        tracing::warn!(
                            "Request failed (attempt {}), retrying after {:?}: {}",
                            attempt + 1,
                            delay,
                            e
                        );
                    }
                }
                result => return result,
            }

            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| FetchError::UnsupportedMethod(request.method.clone()))?;

        let client = match request.redirect {
            RequestRedirect::Follow => &self.following,
            RequestRedirect::Manual | RequestRedirect::Error => &self.manual,
        };

        let mut req_builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            req_builder = req_builder.header(name, value);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                tracing::trace!(header = %name, "skipping non-text header value");
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        if request.redirect == RequestRedirect::Error && status::is_redirect_status(status) {
            let location = headers
                .get(header_names::LOCATION)
                .cloned()
                .unwrap_or_else(|| request.url.clone());
            return Err(FetchError::RedirectNotAllowed(location));
        }

        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
        signal: Option<AbortSignal>,
    ) -> Result<TransportResponse> {
        let Some(signal) = signal else {
            return self.send_with_retries(&request).await;
        };

        if signal.aborted() {
            return Err(FetchError::Aborted);
        }

        tokio::select! {
            _ = signal.cancelled() => {
                tracing::debug!(url = %request.url, "request aborted");
                Err(FetchError::Aborted)
            }
            result = self.send_with_retries(&request) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{RequestCache, RequestInit};
    use crate::types::AbortController;
    use parking_lot::Mutex;

    /// Records what it was sent and replies with a fixed response.
    struct RecordingTransport {
        sent: Mutex<Vec<TransportRequest>>,
        reply: TransportResponse,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(
            &self,
            request: TransportRequest,
            _signal: Option<AbortSignal>,
        ) -> Result<TransportResponse> {
            self.sent.lock().push(request);
            Ok(self.reply.clone())
        }
    }

    fn recording(status: u16, body: &'static str) -> RecordingTransport {
        RecordingTransport {
            sent: Mutex::new(Vec::new()),
            reply: TransportResponse {
                status,
                headers: BTreeMap::new(),
                body: bytes::Bytes::from_static(body.as_bytes()),
            },
        }
    }

    fn quick_config(max_retries: u32) -> ClientConfig {
        ClientConfig {
            max_retries,
            retry_delay_ms: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_encodes_request() {
        let transport = recording(200, "done");
        let request = Request::new(
            "https://example.com/submit",
            RequestInit {
                method: Some("post".into()),
                body: Some("payload".into()),
                cache: Some(RequestCache::NoStore),
                ..Default::default()
            },
        )
        .unwrap();

        let mut response = fetch(&transport, request).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "done");
        assert_eq!(response.url(), "https://example.com/submit");
        assert_eq!(response.response_type(), ResponseType::Basic);

        let sent = transport.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "POST");
        assert_eq!(sent[0].cache, RequestCache::NoStore);
        assert_eq!(sent[0].body.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn test_fetch_no_cors_is_opaque() {
        let transport = recording(200, "hidden");
        let request = Request::new(
            "https://other.example/",
            RequestInit {
                mode: Some(RequestMode::NoCors),
                ..Default::default()
            },
        )
        .unwrap();

        let mut response = fetch(&transport, request).await.unwrap();
        assert_eq!(response.response_type(), ResponseType::Opaque);
        assert_eq!(response.blob().await.unwrap().size(), 0);
    }

    #[tokio::test]
    async fn test_fetch_rejects_aborted_signal() {
        let transport = recording(200, "");
        let controller = AbortController::new();
        controller.abort();
        let request = Request::new(
            "https://example.com/",
            RequestInit {
                signal: Some(controller.signal()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(matches!(
            fetch(&transport, request).await,
            Err(FetchError::Aborted)
        ));
        assert!(transport.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_used_body() {
        let transport = recording(200, "");
        let mut request = Request::new(
            "https://example.com/",
            RequestInit {
                method: Some("PUT".into()),
                body: Some("x".into()),
                ..Default::default()
            },
        )
        .unwrap();
        request.text().await.unwrap();

        assert!(matches!(
            fetch(&transport, request).await,
            Err(FetchError::BodyAlreadyUsed)
        ));
    }

    #[tokio::test]
    async fn test_reqwest_get() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hello")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("world")
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request = Request::new(format!("{}/hello", server.url()), RequestInit::default()).unwrap();
        let mut response = fetch(&transport, request).await.unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.ok());
        assert_eq!(response.headers().get("content-type"), Some("text/plain"));
        assert_eq!(response.text().await.unwrap(), "world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reqwest_posts_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/form")
            .match_header(
                "content-type",
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .match_body("a=1&b=x+y")
            .with_status(201)
            .create_async()
            .await;

        let mut params = crate::form::UrlSearchParams::new();
        params.append("a", "1");
        params.append("b", "x y");

        let transport = ReqwestTransport::new().unwrap();
        let request = Request::new(
            format!("{}/form", server.url()),
            RequestInit {
                method: Some("POST".into()),
                body: Some(params.into()),
                ..Default::default()
            },
        )
        .unwrap();

        let response = fetch(&transport, request).await.unwrap();
        assert_eq!(response.status(), 201);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retries_idempotent_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let transport = ReqwestTransport::with_config(quick_config(2)).unwrap();
        let request = Request::new(format!("{}/flaky", server.url()), RequestInit::default()).unwrap();
        let response = fetch(&transport, request).await.unwrap();

        assert_eq!(response.status(), 503);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_does_not_retry_post() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let transport = ReqwestTransport::with_config(quick_config(2)).unwrap();
        let request = Request::new(
            format!("{}/flaky", server.url()),
            RequestInit {
                method: Some("POST".into()),
                body: Some("x".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let response = fetch(&transport, request).await.unwrap();

        assert_eq!(response.status(), 503);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unbuildable_request_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/never")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let transport = ReqwestTransport::with_config(quick_config(3)).unwrap();
        let request = Request::new(
            format!("{}/never", server.url()),
            RequestInit {
                headers: Some([("x-note", "line one\nline two")].into()),
                ..Default::default()
            },
        )
        .unwrap();

        let result = fetch(&transport, request).await;
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))), "{result:?}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_modes() {
        let mut server = mockito::Server::new_async().await;
        let target = format!("{}/final", server.url());
        let _moved = server
            .mock("GET", "/moved")
            .with_status(302)
            .with_header("location", &target)
            .expect_at_least(1)
            .create_async()
            .await;
        let _final = server
            .mock("GET", "/final")
            .with_status(200)
            .with_body("arrived")
            .create_async()
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request_with = |redirect| {
            Request::new(
                format!("{}/moved", server.url()),
                RequestInit {
                    redirect: Some(redirect),
                    ..Default::default()
                },
            )
            .unwrap()
        };

        let mut followed = fetch(&transport, request_with(RequestRedirect::Follow)).await.unwrap();
        assert_eq!(followed.status(), 200);
        assert_eq!(followed.text().await.unwrap(), "arrived");

        let manual = fetch(&transport, request_with(RequestRedirect::Manual)).await.unwrap();
        assert_eq!(manual.status(), 302);
        assert!(manual.redirected());
        assert_eq!(manual.url(), target);

        let error = fetch(&transport, request_with(RequestRedirect::Error)).await;
        assert!(matches!(error, Err(FetchError::RedirectNotAllowed(ref url)) if *url == target));
    }

    #[tokio::test]
    async fn test_abort_in_flight() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let controller = AbortController::new();
        let request = Request::new(
            format!("http://{addr}/hang"),
            RequestInit {
                signal: Some(controller.signal()),
                ..Default::default()
            },
        )
        .unwrap();

        let transport = ReqwestTransport::new().unwrap();
        let pending = tokio::spawn(async move { fetch(&transport, request).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.abort();

        let result = tokio::time::timeout(Duration::from_secs(5), pending)
            .await
            .expect("abort should end the request")
            .unwrap();
        assert!(matches!(result, Err(FetchError::Aborted)));
        server.abort();
    }

    #[tokio::test]
    async fn test_connection_errors_map_to_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let request = Request::new(format!("http://{addr}/"), RequestInit::default()).unwrap();
        let err = fetch(&transport, request).await.unwrap_err();
        assert!(err.is_retryable(), "{err}");
    }
}
