//! Outgoing request messages.
//!
//! A [`Request`] carries a method, a URL, [`Headers`], a single-consumption
//! [`Body`] and the read-only fetch directives (`cache`, `credentials`,
//! `mode`, `redirect`, ...). Construction validates the method, normalises it
//! and infers a Content-Type from the body.
//!
//! # Examples
//!
//! ```
//! use fetch_model::{Request, RequestInit};
//!
//! # tokio_test::block_on(async {
//! let mut request = Request::new(
//!     "https://example.com/submit",
//!     RequestInit {
//!         method: Some("post".into()),
//!         body: Some("payload".into()),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(request.method(), "POST");
//! assert_eq!(request.headers().get("content-type"), Some("text/plain;charset=UTF-8"));
//! assert_eq!(request.text().await.unwrap(), "payload");
//! # });
//! ```

use crate::body::{Body, BodyInit};
use crate::client::TransportRequest;
use crate::error::{FetchError, Result};
use crate::form::FormData;
use crate::protocol::constants::{self, headers as header_names};
use crate::types::{AbortSignal, Blob, ByteStream, Headers, HeadersInit};
use bytes::Bytes;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

static CACHE_BUST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&])_=[^&]*").expect("cache-bust pattern is valid"));

/// Cache directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCache {
    /// Use the HTTP cache normally.
    #[default]
    Default,
    /// Bypass the cache entirely.
    NoStore,
    /// Fetch and update the cache.
    Reload,
    /// Revalidate before using a cached response.
    NoCache,
    /// Use any cached response, stale or not.
    ForceCache,
    /// Only use a cached response.
    OnlyIfCached,
}

/// Credentials directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCredentials {
    /// Never send credentials.
    Omit,
    /// Send credentials to the same origin only.
    #[default]
    SameOrigin,
    /// Always send credentials.
    Include,
}

/// Mode directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Cross-origin requests follow CORS.
    #[default]
    Cors,
    /// Cross-origin responses are opaque.
    NoCors,
    /// Cross-origin requests fail.
    SameOrigin,
    /// Document navigation.
    Navigate,
}

/// Redirect directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestRedirect {
    /// Follow redirects.
    #[default]
    Follow,
    /// Fail on a redirect.
    Error,
    /// Return the redirect response as-is.
    Manual,
}

/// Options for [`Request::new`] and [`Request::from_request`].
///
/// Every field is optional; unset fields take the defaults (or, for
/// [`Request::from_request`], the source request's values).
#[derive(Debug, Default)]
pub struct RequestInit {
    /// Method; GET when unset.
    pub method: Option<String>,
    /// Initial headers.
    pub headers: Option<HeadersInit>,
    /// Body; not allowed for GET or HEAD.
    pub body: Option<BodyInit>,
    /// Cache directive.
    pub cache: Option<RequestCache>,
    /// Credentials directive.
    pub credentials: Option<RequestCredentials>,
    /// Mode directive.
    pub mode: Option<RequestMode>,
    /// Redirect directive.
    pub redirect: Option<RequestRedirect>,
    /// Referrer.
    pub referrer: Option<String>,
    /// Referrer policy.
    pub referrer_policy: Option<String>,
    /// Subresource integrity metadata.
    pub integrity: Option<String>,
    /// Keepalive flag.
    pub keepalive: Option<bool>,
    /// Abort signal.
    pub signal: Option<AbortSignal>,
}

/// An HTTP request message.
#[derive(Debug)]
pub struct Request {
    method: String,
    url: String,
    headers: Headers,
    body: Body,
    cache: RequestCache,
    credentials: RequestCredentials,
    mode: RequestMode,
    redirect: RequestRedirect,
    referrer: String,
    referrer_policy: String,
    integrity: String,
    keepalive: bool,
    signal: Option<AbortSignal>,
}

impl Request {
    /// Build a request for `url`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UnsupportedMethod`] for CONNECT, TRACE or TRACK
    /// - [`FetchError::BodyNotAllowedForMethod`] for GET or HEAD with a body
    /// - [`FetchError::InvalidHeaderName`] for invalid init headers
    pub fn new(url: impl Into<String>, init: RequestInit) -> Result<Self> {
        Self::build(url.into(), init, None, Body::empty(), RequestDirectives::default())
    }

    /// Build a request from another one, inheriting every field `init` leaves
    /// unset.
    ///
    /// The source body is copied with [`Body::try_clone`], so a consumed source
    /// fails with [`FetchError::BodyAlreadyUsed`].
    pub fn from_request(source: &mut Request, init: RequestInit) -> Result<Self> {
        let inherited_body = match init.body {
            Some(_) => Body::empty(),
            None => source.body.try_clone()?,
        };
        let headers = match init.headers {
            Some(_) => None,
            None => Some(source.headers.clone()),
        };
        let init = RequestInit {
            method: init.method.or_else(|| Some(source.method.clone())),
            ..init
        };
        Self::build(
            source.url.clone(),
            init,
            headers,
            inherited_body,
            source.directives(),
        )
    }

    fn build(
        url: String,
        init: RequestInit,
        inherited_headers: Option<Headers>,
        inherited_body: Body,
        inherited: RequestDirectives,
    ) -> Result<Self> {
        let method = init.method.unwrap_or_else(|| "GET".to_string());

        if constants::FORBIDDEN_METHODS
            .iter()
            .any(|forbidden| forbidden.eq_ignore_ascii_case(&method))
        {
            return Err(FetchError::UnsupportedMethod(method));
        }

        let method = normalize_method(&method);
        let has_body = init.body.is_some() || inherited_body.is_present();
        if has_body && (method == "GET" || method == "HEAD") {
            return Err(FetchError::BodyNotAllowedForMethod(method));
        }

        let mut headers = match (inherited_headers, init.headers) {
            (_, Some(init)) => Headers::from_init(init)?,
            (Some(headers), None) => headers,
            (None, None) => Headers::new(),
        };

        let body = match init.body {
            Some(body_init) => {
                if !headers.has(header_names::CONTENT_TYPE) {
                    if let Some(content_type) = body_init.content_type() {
                        headers.set(header_names::CONTENT_TYPE, content_type)?;
                    }
                }
                Body::new(Some(body_init))
            }
            None => inherited_body,
        };

        let cache = init.cache.unwrap_or(inherited.cache);
        let url = if (method == "GET" || method == "HEAD")
            && matches!(cache, RequestCache::NoStore | RequestCache::NoCache)
        {
            bust_cache(&url)
        } else {
            url
        };

        tracing::trace!(method = %method, url = %url, "constructed request");

        Ok(Request {
            method,
            url,
            headers,
            body,
            cache,
            credentials: init.credentials.unwrap_or(inherited.credentials),
            mode: init.mode.unwrap_or(inherited.mode),
            redirect: init.redirect.unwrap_or(inherited.redirect),
            referrer: init.referrer.unwrap_or(inherited.referrer),
            referrer_policy: init.referrer_policy.unwrap_or(inherited.referrer_policy),
            integrity: init.integrity.unwrap_or(inherited.integrity),
            keepalive: init.keepalive.unwrap_or(inherited.keepalive),
            signal: init.signal.or(inherited.signal),
        })
    }

    fn directives(&self) -> RequestDirectives {
        RequestDirectives {
            cache: self.cache,
            credentials: self.credentials,
            mode: self.mode,
            redirect: self.redirect,
            referrer: self.referrer.clone(),
            referrer_policy: self.referrer_policy.clone(),
            integrity: self.integrity.clone(),
            keepalive: self.keepalive,
            signal: self.signal.clone(),
        }
    }

    /// An independent copy of this request.
    ///
    /// # Errors
    ///
    /// [`FetchError::BodyAlreadyUsed`] once the body has been read.
    pub fn try_clone(&mut self) -> Result<Request> {
        if self.body.body_used() {
            return Err(FetchError::BodyAlreadyUsed);
        }
        Ok(Request {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
            cache: self.cache,
            credentials: self.credentials,
            mode: self.mode,
            redirect: self.redirect,
            referrer: self.referrer.clone(),
            referrer_policy: self.referrer_policy.clone(),
            integrity: self.integrity.clone(),
            keepalive: self.keepalive,
            signal: self.signal.clone(),
        })
    }

    /// Normalised method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Target URL, including any cache-busting parameter.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable request headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Cache directive.
    pub fn cache(&self) -> RequestCache {
        self.cache
    }

    /// Credentials directive.
    pub fn credentials(&self) -> RequestCredentials {
        self.credentials
    }

    /// Always `"worker"`.
    pub fn destination(&self) -> &'static str {
        "worker"
    }

    /// Mode directive.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Redirect directive.
    pub fn redirect(&self) -> RequestRedirect {
        self.redirect
    }

    /// Referrer, empty by default.
    pub fn referrer(&self) -> &str {
        &self.referrer
    }

    /// Referrer policy, empty by default.
    pub fn referrer_policy(&self) -> &str {
        &self.referrer_policy
    }

    /// Subresource integrity metadata.
    pub fn integrity(&self) -> &str {
        &self.integrity
    }

    /// Keepalive flag.
    pub fn keepalive(&self) -> bool {
        self.keepalive
    }

    /// Abort signal observed by the transport.
    pub fn signal(&self) -> Option<&AbortSignal> {
        self.signal.as_ref()
    }

    /// Whether the body has been read.
    pub fn body_used(&self) -> bool {
        self.body.body_used()
    }

    /// Stream view of the body; see [`Body::stream`].
    pub fn body(&mut self) -> Result<Option<ByteStream>> {
        self.body.stream(&mut self.headers)
    }

    /// Read the body as text.
    pub async fn text(&mut self) -> Result<String> {
        self.body.text(&mut self.headers).await
    }

    /// Read the body as bytes.
    pub async fn array_buffer(&mut self) -> Result<Bytes> {
        self.body.array_buffer(&mut self.headers).await
    }

    /// Read the body as a [`Blob`].
    pub async fn blob(&mut self) -> Result<Blob> {
        self.body.blob(&mut self.headers, false).await
    }

    /// Read the body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.body.json(&mut self.headers).await
    }

    /// Read the body as form data.
    pub async fn form_data(&mut self) -> Result<FormData> {
        self.body.form_data(&mut self.headers).await
    }

    /// Consume the request into the wire shape handed to a transport.
    pub async fn into_transport(self) -> Result<(TransportRequest, Option<AbortSignal>)> {
        let Request {
            method,
            url,
            mut headers,
            body,
            cache,
            credentials,
            mode,
            redirect,
            referrer,
            referrer_policy,
            integrity,
            keepalive,
            signal,
        } = self;

        let body = body.into_bytes(&mut headers).await?;

        let request = TransportRequest {
            method,
            url,
            headers: headers.to_map(),
            body,
            cache,
            credentials,
            mode,
            redirect,
            referrer,
            referrer_policy,
            integrity,
            keepalive,
        };
        Ok((request, signal))
    }
}

#[derive(Debug, Clone, Default)]
struct RequestDirectives {
    cache: RequestCache,
    credentials: RequestCredentials,
    mode: RequestMode,
    redirect: RequestRedirect,
    referrer: String,
    referrer_policy: String,
    integrity: String,
    keepalive: bool,
    signal: Option<AbortSignal>,
}

/// Uppercase the well-known methods; keep any other method as given.
pub fn normalize_method(method: &str) -> String {
    let upper = method.to_ascii_uppercase();
    if constants::NORMALIZED_METHODS.contains(&upper.as_str()) {
        upper
    } else {
        method.to_string()
    }
}

/// Refresh or append the `_=` cache-busting parameter.
fn bust_cache(url: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let (target, fragment) = match url.find('#') {
        Some(at) => url.split_at(at),
        None => (url, ""),
    };

    let busted = if CACHE_BUST_PATTERN.is_match(target) {
        CACHE_BUST_PATTERN
            .replace(target, format!("${{1}}{}={now}", constants::CACHE_BUST_PARAM))
            .into_owned()
    } else {
        let separator = if target.contains('?') { '&' } else { '?' };
        format!("{target}{separator}{}={now}", constants::CACHE_BUST_PARAM)
    };
    format!("{busted}{fragment}")
}
