//! The single-consumption body shared by [`Request`](crate::Request) and
//! [`Response`](crate::Response).
//!
//! A [`Body`] holds one value fixed at construction and a [`BodyState`]. The
//! first consuming read moves the state to [`BodyState::Read`]; every later
//! read fails with [`FetchError::BodyAlreadyUsed`].
//!
//! # Body Shapes
//!
//! | Init | Stored as | Inferred Content-Type |
//! |------|-----------|-----------------------|
//! | text | text | `text/plain;charset=UTF-8` |
//! | bytes | bytes | none |
//! | [`Blob`] | blob | the blob's type, when not empty |
//! | [`FormData`] | form | none (set to multipart when encoded) |
//! | [`UrlSearchParams`] | serialized text | `application/x-www-form-urlencoded;charset=UTF-8` |
//! | [`ByteStream`] | stream | none |
//!
//! Readers take the owning message's headers because encoding a form body
//! writes the multipart boundary into `Content-Type`.
//!
//! # Examples
//!
//! ```
//! use fetch_model::{Body, BodyInit, Headers};
//!
//! # tokio_test::block_on(async {
//! let mut headers = Headers::new();
//! let mut body = Body::new(Some(BodyInit::from("hi")));
//!
//! assert_eq!(body.text(&mut headers).await.unwrap(), "hi");
//! assert!(body.body_used());
//! assert!(body.text(&mut headers).await.is_err());
//! # });
//! ```

use crate::error::{FetchError, Result};
use crate::form::{codec, FormData, UrlSearchParams};
use crate::protocol::constants::{headers as header_names, media_types};
use crate::types::{Blob, ByteStream, Headers};
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Values a message body can be constructed from.
#[derive(Debug)]
pub enum BodyInit {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Typed bytes.
    Blob(Blob),
    /// Structured form fields, encoded as multipart on read.
    FormData(FormData),
    /// Query parameters, encoded as urlencoded text.
    SearchParams(UrlSearchParams),
    /// Chunks produced asynchronously.
    Stream(ByteStream),
}

impl BodyInit {
    /// The Content-Type implied by this value, if any.
    pub fn content_type(&self) -> Option<String> {
        match self {
            BodyInit::Text(_) => Some(media_types::TEXT_PLAIN_UTF8.to_string()),
            BodyInit::Blob(blob) if !blob.content_type().is_empty() => {
                Some(blob.content_type().to_string())
            }
            BodyInit::SearchParams(_) => Some(media_types::FORM_URLENCODED_UTF8.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for BodyInit {
    fn from(text: &str) -> Self {
        BodyInit::Text(text.to_string())
    }
}

impl From<String> for BodyInit {
    fn from(text: String) -> Self {
        BodyInit::Text(text)
    }
}

impl From<Bytes> for BodyInit {
    fn from(bytes: Bytes) -> Self {
        BodyInit::Bytes(bytes)
    }
}

impl From<Vec<u8>> for BodyInit {
    fn from(bytes: Vec<u8>) -> Self {
        BodyInit::Bytes(Bytes::from(bytes))
    }
}

impl From<Blob> for BodyInit {
    fn from(blob: Blob) -> Self {
        BodyInit::Blob(blob)
    }
}

impl From<FormData> for BodyInit {
    fn from(data: FormData) -> Self {
        BodyInit::FormData(data)
    }
}

impl From<UrlSearchParams> for BodyInit {
    fn from(params: UrlSearchParams) -> Self {
        BodyInit::SearchParams(params)
    }
}

impl From<ByteStream> for BodyInit {
    fn from(stream: ByteStream) -> Self {
        BodyInit::Stream(stream)
    }
}

/// Whether a body has been consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyState {
    /// No consuming read has happened yet.
    #[default]
    Unread,
    /// A consuming read has happened; the body cannot be read again.
    Read,
}

#[derive(Debug)]
enum BodyValue {
    Text(String),
    Bytes(Bytes),
    Blob(Blob),
    Form(FormData),
    Stream(ByteStream),
}

/// A message body with its consumption state.
#[derive(Debug, Default)]
pub struct Body {
    value: Option<BodyValue>,
    state: BodyState,
}

impl Body {
    /// Create a body from an optional init value.
    pub fn new(init: Option<BodyInit>) -> Self {
        let value = init.map(|init| match init {
            BodyInit::Text(text) => BodyValue::Text(text),
            BodyInit::Bytes(bytes) => BodyValue::Bytes(bytes),
            BodyInit::Blob(blob) => BodyValue::Blob(blob),
            BodyInit::FormData(data) => BodyValue::Form(data),
            BodyInit::SearchParams(params) => BodyValue::Text(params.to_string()),
            BodyInit::Stream(stream) => BodyValue::Stream(stream),
        });

        Body {
            value,
            state: BodyState::Unread,
        }
    }

    /// An absent body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a body value is present.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Whether a consuming read has happened.
    pub fn body_used(&self) -> bool {
        self.state == BodyState::Read
    }

    /// Current consumption state.
    pub fn state(&self) -> BodyState {
        self.state
    }

    fn mark_read(&mut self) -> Result<()> {
        if self.state == BodyState::Read {
            return Err(FetchError::BodyAlreadyUsed);
        }
        self.state = BodyState::Read;
        Ok(())
    }

    /// Mark the body read and produce its bytes.
    ///
    /// A stream is drained to its end and replaced by the drained bytes.
    async fn consume(&mut self, headers: &mut Headers) -> Result<Bytes> {
        self.mark_read()?;

        let bytes = match &mut self.value {
            None => Bytes::new(),
            Some(BodyValue::Text(text)) => Bytes::copy_from_slice(text.as_bytes()),
            Some(BodyValue::Bytes(bytes)) => bytes.clone(),
            Some(BodyValue::Blob(blob)) => blob.bytes().clone(),
            Some(BodyValue::Form(data)) => codec::encode_multipart_into(data, headers)?,
            Some(BodyValue::Stream(stream)) => {
                let drained = stream.read_to_end().await?;
                tracing::trace!(bytes = drained.len(), "drained stream body");
                self.value = Some(BodyValue::Bytes(drained.clone()));
                drained
            }
        };
        Ok(bytes)
    }

    /// Read the body as text.
    ///
    /// # Errors
    ///
    /// [`FetchError::BodyAlreadyUsed`] on a second read, or the stream's error
    /// when a stream body fails while draining.
    pub async fn text(&mut self, headers: &mut Headers) -> Result<String> {
        if let (BodyState::Unread, Some(BodyValue::Text(text))) = (self.state, &self.value) {
            let text = text.clone();
            self.state = BodyState::Read;
            tracing::trace!(len = text.len(), "read text body");
            return Ok(text);
        }

        let bytes = self.consume(headers).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read the body as raw bytes.
    pub async fn array_buffer(&mut self, headers: &mut Headers) -> Result<Bytes> {
        self.consume(headers).await
    }

    /// Read the body as a [`Blob`].
    ///
    /// When `opaque` is set the result is an empty blob and the body is left
    /// unread. Otherwise the blob's type is the body blob's own type, then the
    /// Content-Type header, then empty.
    pub async fn blob(&mut self, headers: &mut Headers, opaque: bool) -> Result<Blob> {
        if self.body_used() {
            return Err(FetchError::BodyAlreadyUsed);
        }
        if opaque {
            return Ok(Blob::default());
        }

        let own_type = match &self.value {
            Some(BodyValue::Blob(blob)) => blob.content_type().to_string(),
            _ => String::new(),
        };
        let bytes = self.consume(headers).await?;

        let content_type = if own_type.is_empty() {
            headers
                .get(header_names::CONTENT_TYPE)
                .unwrap_or_default()
                .to_string()
        } else {
            own_type
        };
        Ok(Blob::new(bytes, content_type))
    }

    /// Read the body as JSON.
    ///
    /// The body is consumed even when parsing fails.
    pub async fn json<T: DeserializeOwned>(&mut self, headers: &mut Headers) -> Result<T> {
        let text = self.text(headers).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read the body as form data.
    ///
    /// A form body is returned as-is. Text and stream bodies are decoded
    /// according to the Content-Type header.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UnsupportedBodyConversion`] for byte and blob bodies,
    ///   which are left unread
    /// - [`FetchError::UnsupportedContentType`] when the Content-Type is not a
    ///   form encoding
    pub async fn form_data(&mut self, headers: &mut Headers) -> Result<FormData> {
        if self.body_used() {
            return Err(FetchError::BodyAlreadyUsed);
        }

        match &self.value {
            Some(BodyValue::Bytes(_)) | Some(BodyValue::Blob(_)) => {
                Err(FetchError::UnsupportedBodyConversion)
            }
            Some(BodyValue::Form(data)) => {
                let data = data.clone();
                self.state = BodyState::Read;
                Ok(data)
            }
            _ => {
                let text = self.text(headers).await?;
                tracing::debug!(
                    content_type = headers.get(header_names::CONTENT_TYPE).unwrap_or_default(),
                    "decoding form body"
                );
                codec::decode_from_headers(headers, &text)
            }
        }
    }

    /// A stream view of the body.
    ///
    /// A stream body is handed over and the body becomes read. Any other body
    /// yields a one-shot stream of its value and stays unread. Returns `None`
    /// for an absent body.
    pub fn stream(&mut self, headers: &mut Headers) -> Result<Option<ByteStream>> {
        let value = match self.value.take() {
            None => return Ok(None),
            Some(BodyValue::Stream(stream)) => {
                self.state = BodyState::Read;
                return Ok(Some(stream));
            }
            Some(value) => value,
        };

        let view = match &value {
            BodyValue::Text(text) => Ok(ByteStream::once(text.clone())),
            BodyValue::Bytes(bytes) => Ok(ByteStream::once(bytes.clone())),
            BodyValue::Blob(blob) => Ok(blob.stream()),
            BodyValue::Form(data) => {
                codec::encode_multipart_into(data, headers).map(ByteStream::once)
            }
            BodyValue::Stream(_) => Ok(ByteStream::empty()),
        };
        self.value = Some(value);
        view.map(Some)
    }

    /// An independent copy of an unread body.
    ///
    /// Stream bodies are split so that this body and the copy each yield every
    /// chunk.
    pub fn try_clone(&mut self) -> Result<Body> {
        if self.body_used() {
            return Err(FetchError::BodyAlreadyUsed);
        }

        let (kept, copy) = match self.value.take() {
            None => (None, None),
            Some(BodyValue::Stream(stream)) => {
                let (left, right) = stream.tee();
                (BodyValue::Stream(left).into(), BodyValue::Stream(right).into())
            }
            Some(BodyValue::Text(text)) => {
                (BodyValue::Text(text.clone()).into(), BodyValue::Text(text).into())
            }
            Some(BodyValue::Bytes(bytes)) => {
                (BodyValue::Bytes(bytes.clone()).into(), BodyValue::Bytes(bytes).into())
            }
            Some(BodyValue::Blob(blob)) => {
                (BodyValue::Blob(blob.clone()).into(), BodyValue::Blob(blob).into())
            }
            Some(BodyValue::Form(data)) => {
                (BodyValue::Form(data.clone()).into(), BodyValue::Form(data).into())
            }
        };
        self.value = kept;

        Ok(Body {
            value: copy,
            state: BodyState::Unread,
        })
    }

    /// Consume the body into transport bytes. `None` for an absent body.
    pub async fn into_bytes(mut self, headers: &mut Headers) -> Result<Option<Bytes>> {
        if self.value.is_none() {
            return Ok(None);
        }
        self.consume(headers).await.map(Some)
    }
}
