//! The seam between the message model and whatever performs network I/O.
//!
//! [`TransportRequest`] and [`TransportResponse`] are plain data and
//! serialize with `serde`, so a host can carry them across a JSON boundary.

use crate::error::Result;
use crate::request::{RequestCache, RequestCredentials, RequestMode, RequestRedirect};
use crate::types::AbortSignal;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request in wire form: encoded body, flattened headers, directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRequest {
    /// Normalised method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Lowercased header names and their combined values.
    pub headers: BTreeMap<String, String>,
    /// Encoded body, if any.
    #[serde(default)]
    pub body: Option<Bytes>,
    /// Cache directive.
    #[serde(default)]
    pub cache: RequestCache,
    /// Credentials directive.
    #[serde(default)]
    pub credentials: RequestCredentials,
    /// Mode directive.
    #[serde(default)]
    pub mode: RequestMode,
    /// Redirect directive; transports decide whether to follow.
    #[serde(default)]
    pub redirect: RequestRedirect,
    /// Referrer.
    #[serde(default)]
    pub referrer: String,
    /// Referrer policy.
    #[serde(default)]
    pub referrer_policy: String,
    /// Subresource integrity metadata.
    #[serde(default)]
    pub integrity: String,
    /// Whether the request may outlive its initiator.
    #[serde(default)]
    pub keepalive: bool,
}

/// A transport's raw reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Full response body.
    #[serde(default)]
    pub body: Bytes,
}

/// Performs the network exchange for [`fetch`](super::fetch).
///
/// Implementations should stop and return
/// [`FetchError::Aborted`](crate::FetchError::Aborted) once `signal` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the complete response.
    async fn send(
        &self,
        request: TransportRequest,
        signal: Option<AbortSignal>,
    ) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_shape() {
        let request = TransportRequest {
            method: "POST".into(),
            url: "https://example.com/".into(),
            mode: RequestMode::NoCors,
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mode"], "no-cors");
        assert_eq!(value["cache"], "default");
        assert_eq!(value["redirect"], "follow");

        let parsed: TransportRequest =
            serde_json::from_str(r#"{"method":"GET","url":"https://a.test/","headers":{}}"#).unwrap();
        assert_eq!(parsed.credentials, RequestCredentials::SameOrigin);
        assert_eq!(parsed.body, None);
    }

    #[test]
    fn test_response_round_trips_through_json() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        let response = TransportResponse {
            status: 200,
            headers,
            body: Bytes::from_static(b"ok"),
        };
        let text = serde_json::to_string(&response).unwrap();
        let parsed: TransportResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, response);
    }
}
