//! Immutable, typed byte containers.

use super::stream::ByteStream;
use bytes::{Bytes, BytesMut};

/// An immutable chunk of bytes labelled with a media type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: String,
}

/// One input piece for [`Blob::from_parts`].
#[derive(Debug, Clone)]
pub enum BlobPart {
    /// UTF-8 encoded on concatenation.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Another blob's bytes; its type is ignored.
    Blob(Blob),
}

impl Blob {
    /// Create a blob from bytes and a media type (empty for none).
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Blob {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Concatenate parts into a single blob.
    pub fn from_parts(parts: impl IntoIterator<Item = BlobPart>, content_type: impl Into<String>) -> Self {
        let mut buffer = BytesMut::new();
        for part in parts {
            match part {
                BlobPart::Text(text) => buffer.extend_from_slice(text.as_bytes()),
                BlobPart::Bytes(bytes) => buffer.extend_from_slice(&bytes),
                BlobPart::Blob(blob) => buffer.extend_from_slice(&blob.bytes),
            }
        }
        Blob::new(buffer.freeze(), content_type)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Declared media type, possibly empty.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The blob's bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Copy of the blob's bytes. Cheap: `Bytes` is reference counted.
    pub async fn array_buffer(&self) -> Bytes {
        self.bytes.clone()
    }

    /// The bytes decoded as UTF-8, replacing invalid sequences.
    pub async fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// A one-shot stream yielding the whole blob.
    pub fn stream(&self) -> ByteStream {
        ByteStream::once(self.bytes.clone())
    }

    /// A sub-range of the blob.
    ///
    /// Negative indices count from the end and out-of-range indices are clamped.
    /// `content_type` of `None` keeps this blob's type.
    pub fn slice(&self, start: i64, end: Option<i64>, content_type: Option<&str>) -> Blob {
        let len = self.bytes.len() as i64;
        let clamp = |index: i64| -> usize {
            let resolved = if index < 0 { len + index } else { index };
            resolved.clamp(0, len) as usize
        };

        let from = clamp(start);
        let to = clamp(end.unwrap_or(len)).max(from);

        Blob {
            bytes: self.bytes.slice(from..to),
            content_type: content_type
                .map(str::to_string)
                .unwrap_or_else(|| self.content_type.clone()),
        }
    }
}

impl From<&str> for BlobPart {
    fn from(text: &str) -> Self {
        BlobPart::Text(text.to_string())
    }
}

impl From<Bytes> for BlobPart {
    fn from(bytes: Bytes) -> Self {
        BlobPart::Bytes(bytes)
    }
}

impl From<Blob> for BlobPart {
    fn from(blob: Blob) -> Self {
        BlobPart::Blob(blob)
    }
}
