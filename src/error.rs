//! Error types for the fetch message model.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`FetchError`]. Construction and validation errors (`InvalidHeaderName`,
//! `BodyNotAllowedForMethod`, `InvalidRedirectStatus`, ...) surface synchronously;
//! body-reading errors (`BodyAlreadyUsed`, `UnsupportedContentType`,
//! `UnsupportedBodyConversion`, `InvalidJson`) surface from the async readers.
//!
//! Nothing in the message model retries. [`FetchError::is_retryable`] exists only
//! for the reference transport in [`crate::client`].

use thiserror::Error;

/// Errors produced by headers, bodies, messages, codecs and transports.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Header name is empty or contains characters outside the HTTP token grammar.
    #[error("invalid character in header field name: {0:?}")]
    InvalidHeaderName(String),

    /// Header value cannot be represented on the wire.
    #[error("invalid header value for {0:?}")]
    InvalidHeaderValue(String),

    /// A header initializer entry did not have exactly two elements.
    #[error("invalid header initializer: expected a name/value pair, got {0} element(s)")]
    InvalidHeaderInit(usize),

    /// The body was already consumed by a previous read.
    #[error("body stream already read")]
    BodyAlreadyUsed,

    /// GET and HEAD requests cannot carry a body.
    #[error("body not allowed for {0} requests")]
    BodyNotAllowedForMethod(String),

    /// The request method is one the model refuses to represent.
    #[error("'{0}' HTTP method is unsupported")]
    UnsupportedMethod(String),

    /// The content type does not name a form encoding.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// A multipart content type without a `boundary` parameter.
    #[error("multipart content type is missing a boundary")]
    MissingBoundary,

    /// Raw bytes and blobs cannot be read as form data.
    #[error("body cannot be converted to form data")]
    UnsupportedBodyConversion,

    /// The body text is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A value could not be serialized into a JSON body.
    #[error("failed to serialize JSON body: {0}")]
    JsonSerialize(serde_json::Error),

    /// `Response::redirect` was given a non-redirect status.
    #[error("invalid redirect status {0}: expected one of 301, 302, 303, 307, 308")]
    InvalidRedirectStatus(u16),

    /// A URL failed to parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A URL setter rejected its value.
    #[error("cannot set URL {component} to {value:?}")]
    InvalidUrlComponent {
        /// Component the setter writes, such as `protocol`.
        component: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The reading half of a byte stream was dropped.
    #[error("byte stream closed")]
    StreamClosed,

    /// A byte stream produced an error chunk.
    #[error("byte stream error: {0}")]
    Stream(String),

    /// The transport could not build the request; retrying cannot help.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed to deliver the request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request's abort signal fired.
    #[error("request aborted")]
    Aborted,

    /// The server redirected a request whose redirect mode is `error`.
    #[error("redirect to {0} not allowed by redirect mode")]
    RedirectNotAllowed(String),
}

impl FetchError {
    /// Whether a transport may retry the request that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            FetchError::InvalidRequest(error.to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(FetchError::Transport("reset".into()).is_retryable());
        assert!(!FetchError::BodyAlreadyUsed.is_retryable());
        assert!(!FetchError::Aborted.is_retryable());
        assert!(!FetchError::InvalidRequest("bad header".into()).is_retryable());
    }

    #[test]
    fn test_reqwest_builder_errors_are_not_retryable() {
        let source = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(source.is_builder());

        let err = FetchError::from(source);
        assert!(matches!(err, FetchError::InvalidRequest(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_json_error_converts() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, FetchError::InvalidJson(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FetchError::InvalidRedirectStatus(200).to_string(),
            "invalid redirect status 200: expected one of 301, 302, 303, 307, 308"
        );
        assert_eq!(FetchError::BodyAlreadyUsed.to_string(), "body stream already read");
    }
}
