//! Incoming (or synthesized) response messages.
//!
//! # Key Properties
//!
//! - **Null-body statuses**: 101, 103, 204, 205 and 304 never carry a body,
//!   whatever was passed to [`Response::new`]
//! - **Status text**: taken from the reason-phrase table unless overridden
//! - **`url()`**: the `Location` header when present, else the URL the
//!   response was fetched from
//!
//! # Examples
//!
//! ```
//! use fetch_model::{Response, ResponseInit};
//!
//! # tokio_test::block_on(async {
//! let mut response = Response::new(
//!     Some("ignored".into()),
//!     ResponseInit { status: Some(204), ..Default::default() },
//! )
//! .unwrap();
//! assert_eq!(response.status_text(), "No Content");
//! assert_eq!(response.text().await.unwrap(), "");
//!
//! let redirect = Response::redirect("https://example.com/next", 302).unwrap();
//! assert!(redirect.redirected());
//! assert_eq!(redirect.url(), "https://example.com/next");
//! # });
//! ```

use crate::body::{Body, BodyInit};
use crate::client::TransportResponse;
use crate::error::{FetchError, Result};
use crate::form::FormData;
use crate::protocol::constants::{headers as header_names, media_types};
use crate::protocol::status;
use crate::types::{Blob, ByteStream, Headers, HeadersInit, Url};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Response type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// A normal same-origin response.
    #[default]
    Basic,
    /// A network error, see [`Response::error`].
    Error,
    /// A no-cors response whose body is hidden from [`Response::blob`].
    Opaque,
}

/// Options for [`Response::new`].
#[derive(Debug, Default)]
pub struct ResponseInit {
    /// Status code, 200 when unset.
    pub status: Option<u16>,
    /// Reason phrase, looked up from the status when unset.
    pub status_text: Option<String>,
    /// Initial headers.
    pub headers: Option<HeadersInit>,
}

/// An HTTP response message.
#[derive(Debug)]
pub struct Response {
    status: u16,
    status_text: String,
    headers: Headers,
    body: Body,
    response_type: ResponseType,
    url: String,
}

impl Response {
    /// Build a response.
    ///
    /// # Errors
    ///
    /// Header initializer errors, see [`Headers::from_init`].
    pub fn new(body: Option<BodyInit>, init: ResponseInit) -> Result<Self> {
        let status = init.status.unwrap_or(200);
        let mut headers = match init.headers {
            Some(init) => Headers::from_init(init)?,
            None => Headers::new(),
        };

        let body = if status::is_null_body_status(status) {
            if body.is_some() {
                tracing::trace!(status, "dropping body for null-body status");
            }
            None
        } else {
            body
        };

        if let Some(content_type) = body.as_ref().and_then(BodyInit::content_type) {
            if !headers.has(header_names::CONTENT_TYPE) {
                headers.set(header_names::CONTENT_TYPE, content_type)?;
            }
        }

        let status_text = init
            .status_text
            .unwrap_or_else(|| status::status_text(status).unwrap_or_default().to_string());

        Ok(Response {
            status,
            status_text,
            headers,
            body: Body::new(body),
            response_type: ResponseType::Basic,
            url: String::new(),
        })
    }

    /// A network-error response: status 0, empty status text, type `error`.
    pub fn error() -> Self {
        Response {
            status: 0,
            status_text: String::new(),
            headers: Headers::new(),
            body: Body::empty(),
            response_type: ResponseType::Error,
            url: String::new(),
        }
    }

    /// A redirect to `url`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidRedirectStatus`] unless `status` is 301, 302,
    ///   303, 307 or 308
    /// - [`FetchError::InvalidUrl`] when `url` does not parse
    pub fn redirect(url: &str, status: u16) -> Result<Self> {
        if !status::is_redirect_status(status) {
            return Err(FetchError::InvalidRedirectStatus(status));
        }

        let location = Url::parse(url, None)?;
        let mut headers = Headers::new();
        headers.set(header_names::LOCATION, location.href())?;

        Response::new(
            Some(format!("Redirecting to {location}").into()),
            ResponseInit {
                status: Some(status),
                headers: Some(headers.into()),
                ..Default::default()
            },
        )
    }

    /// A JSON response serialized from `value`.
    ///
    /// Content-Type defaults to `application/json`. Serialization failures
    /// surface as [`FetchError::JsonSerialize`].
    pub fn from_json<T: Serialize>(value: &T, init: ResponseInit) -> Result<Self> {
        let text = serde_json::to_string(value).map_err(FetchError::JsonSerialize)?;
        let mut headers = match init.headers {
            Some(init) => Headers::from_init(init)?,
            None => Headers::new(),
        };
        if !headers.has(header_names::CONTENT_TYPE) {
            headers.set(header_names::CONTENT_TYPE, media_types::APPLICATION_JSON)?;
        }

        Response::new(
            Some(text.into()),
            ResponseInit {
                headers: Some(headers.into()),
                ..init
            },
        )
    }

    /// Build a response from a transport's raw reply to a request for `url`.
    pub fn from_transport(
        raw: TransportResponse,
        url: impl Into<String>,
        response_type: ResponseType,
    ) -> Result<Self> {
        let headers = Headers::from_map(&raw.headers)?;
        let mut response = Response::new(
            Some(raw.body.into()),
            ResponseInit {
                status: Some(raw.status),
                headers: Some(headers.into()),
                ..Default::default()
            },
        )?;
        response.url = url.into();
        response.response_type = response_type;
        Ok(response)
    }

    /// An independent copy of this response.
    ///
    /// # Errors
    ///
    /// [`FetchError::BodyAlreadyUsed`] once the body has been read.
    pub fn try_clone(&mut self) -> Result<Response> {
        if self.body.body_used() {
            return Err(FetchError::BodyAlreadyUsed);
        }
        Ok(Response {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
            response_type: self.response_type,
            url: self.url.clone(),
        })
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Whether the status is in 200..=299.
    pub fn ok(&self) -> bool {
        status::is_ok_status(self.status)
    }

    /// Whether a `Location` header is present.
    pub fn redirected(&self) -> bool {
        self.headers.has(header_names::LOCATION)
    }

    /// The `Location` header, else the URL this response was fetched from.
    pub fn url(&self) -> &str {
        self.headers
            .get(header_names::LOCATION)
            .unwrap_or(&self.url)
    }

    /// Response type.
    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
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

    /// Read the body as a [`Blob`]; opaque responses yield an empty blob.
    pub async fn blob(&mut self) -> Result<Blob> {
        let opaque = self.response_type == ResponseType::Opaque;
        self.body.blob(&mut self.headers, opaque).await
    }

    /// Read the body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.body.json(&mut self.headers).await
    }

    /// Read the body as form data.
    pub async fn form_data(&mut self) -> Result<FormData> {
        self.body.form_data(&mut self.headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormValue, UrlSearchParams};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_defaults() {
        let response = Response::new(None, ResponseInit::default()).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.status_text(), "OK");
        assert!(response.ok());
        assert!(!response.redirected());
        assert_eq!(response.response_type(), ResponseType::Basic);
        assert_eq!(response.url(), "");
    }

    #[tokio::test]
    async fn test_null_body_statuses_drop_body() {
        for code in [101, 103, 204, 205, 304] {
            let mut response = Response::new(
                Some("x".into()),
                ResponseInit {
                    status: Some(code),
                    ..Default::default()
                },
            )
            .unwrap();
            assert!(!response.headers().has("content-type"));
            assert_eq!(response.text().await.unwrap(), "");
        }
    }

    #[test]
    fn test_status_text_override_and_unknown() {
        let custom = Response::new(
            None,
            ResponseInit {
                status: Some(404),
                status_text: Some("Gone Fishing".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(custom.status_text(), "Gone Fishing");
        assert!(!custom.ok());

        let unknown = Response::new(
            None,
            ResponseInit {
                status: Some(299),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(unknown.status_text(), "");
        assert!(unknown.ok());
    }

    #[test]
    fn test_error() {
        let response = Response::error();
        assert_eq!(response.status(), 0);
        assert_eq!(response.status_text(), "");
        assert_eq!(response.response_type(), ResponseType::Error);
        assert!(!response.ok());
    }

    #[tokio::test]
    async fn test_redirect() {
        let mut response = Response::redirect("https://example.com/next", 302).unwrap();
        assert_eq!(response.status(), 302);
        assert_eq!(response.status_text(), "Found");
        assert_eq!(response.headers().get("location"), Some("https://example.com/next"));
        assert!(response.redirected());
        assert_eq!(
            response.text().await.unwrap(),
            "Redirecting to https://example.com/next"
        );
    }

    #[test]
    fn test_redirect_rejects_bad_input() {
        assert!(matches!(
            Response::redirect("https://example.com/", 200),
            Err(FetchError::InvalidRedirectStatus(200))
        ));
        assert!(matches!(
            Response::redirect("no scheme", 301),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_from_json() {
        let mut response =
            Response::from_json(&json!({"ok": true}), ResponseInit::default()).unwrap();
        assert_eq!(response.headers().get("content-type"), Some("application/json"));
        let value: serde_json::Value = response.json().await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_from_json_reports_serialization_failure() {
        let unkeyable = BTreeMap::from([((1, 2), 3)]);
        let err = Response::from_json(&unkeyable, ResponseInit::default()).unwrap_err();
        assert!(matches!(err, FetchError::JsonSerialize(_)), "{err}");
        assert!(err.to_string().starts_with("failed to serialize JSON body"));
    }

    #[tokio::test]
    async fn test_search_params_body() {
        let mut response = Response::new(
            Some(UrlSearchParams::parse("q=a+b").into()),
            ResponseInit::default(),
        )
        .unwrap();
        let form = response.form_data().await.unwrap();
        assert_eq!(form.get("q"), Some(&FormValue::from("a b")));
    }

    #[tokio::test]
    async fn test_from_transport() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let raw = TransportResponse {
            status: 201,
            headers,
            body: Bytes::from_static(b"created"),
        };

        let mut response =
            Response::from_transport(raw, "https://example.com/items", ResponseType::Basic).unwrap();
        assert_eq!(response.status(), 201);
        assert_eq!(response.status_text(), "Created");
        assert_eq!(response.url(), "https://example.com/items");
        assert_eq!(response.headers().get("content-type"), Some("text/plain"));
        assert_eq!(response.text().await.unwrap(), "created");
    }

    #[tokio::test]
    async fn test_opaque_blob() {
        let raw = TransportResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: Bytes::from_static(b"hidden"),
        };
        let mut response =
            Response::from_transport(raw, "https://other.example/", ResponseType::Opaque).unwrap();
        assert_eq!(response.blob().await.unwrap().size(), 0);
        assert!(!response.body_used());
        assert_eq!(response.text().await.unwrap(), "hidden");
    }

    #[tokio::test]
    async fn test_try_clone() {
        let mut response = Response::new(Some("twice".into()), ResponseInit::default()).unwrap();
        let mut copy = response.try_clone().unwrap();
        assert_eq!(copy.text().await.unwrap(), "twice");
        assert_eq!(response.text().await.unwrap(), "twice");
        assert!(matches!(response.try_clone(), Err(FetchError::BodyAlreadyUsed)));
    }
}
