//! Encoding and decoding of form bodies.
//!
//! Two independent directions:
//!
//! - **Encode** ([`FormData`] / [`UrlSearchParams`] → bytes): `application/x-www-form-urlencoded`
//!   via [`encode_urlencoded`], `multipart/form-data` via [`encode_multipart`] with a
//!   boundary from [`generate_boundary`].
//! - **Decode** (bytes → [`FormData`]): dispatched on the Content-Type by
//!   [`decode`] (explicit calls) or [`decode_from_headers`] (body readers).
//!
//! # Multipart Layout
//!
//! ```text
//! --{boundary}
//! Content-Disposition: form-data; name="{key}"
//!
//! {value}
//! --{boundary}--
//! ```
//!
//! Lines are separated by CRLF on encode; decode accepts CRLF or LF.
//!
//! # Examples
//!
//! ```
//! use fetch_model::form::{self, FormData, FormValue};
//!
//! let mut data = FormData::new();
//! data.append("field", "a");
//! data.append("field", "b");
//!
//! let boundary = form::generate_boundary();
//! let bytes = form::encode_multipart(&data, &boundary);
//! let text = String::from_utf8(bytes.to_vec()).unwrap();
//!
//! let decoded = form::decode_multipart(&text, &boundary);
//! assert_eq!(decoded.get_all("field"), vec![&FormValue::from("a"), &FormValue::from("b")]);
//! ```

use super::list::{FormData, FormValue, UrlSearchParams};
use crate::error::{FetchError, Result};
use crate::protocol::{self, constants};
use crate::types::Headers;
use bytes::{BufMut, Bytes, BytesMut};
use url::form_urlencoded;

const CRLF: &[u8] = b"\r\n";

/// Generate a random boundary that will not collide with form content.
///
/// The token is `----FormBoundary` followed by 32 lowercase hex digits.
pub fn generate_boundary() -> String {
    format!(
        "{}{}",
        constants::BOUNDARY_PREFIX,
        uuid::Uuid::new_v4().simple()
    )
}

/// Encode search params as `key=value&key2=value2`.
pub fn encode_urlencoded(params: &UrlSearchParams) -> String {
    params.to_string()
}

/// Encode form data as `application/x-www-form-urlencoded`.
///
/// File values contribute their bytes decoded as UTF-8.
pub fn encode_form_urlencoded(data: &FormData) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data.entries() {
        serializer.append_pair(key, &value.to_text());
    }
    serializer.finish()
}

/// Encode form data as a `multipart/form-data` body delimited by `boundary`.
pub fn encode_multipart(data: &FormData, boundary: &str) -> Bytes {
    let mut body = BytesMut::new();

    for (key, value) in data.entries() {
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(CRLF);

        match value {
            FormValue::Text(text) => {
                body.put_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"", escape_quoted(key))
                        .as_bytes(),
                );
                body.put_slice(CRLF);
                body.put_slice(CRLF);
                body.put_slice(text.as_bytes());
            }
            FormValue::File { blob, filename } => {
                body.put_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                        escape_quoted(key),
                        escape_quoted(filename)
                    )
                    .as_bytes(),
                );
                body.put_slice(CRLF);
                let content_type = if blob.content_type().is_empty() {
                    "application/octet-stream"
                } else {
                    blob.content_type()
                };
                body.put_slice(format!("Content-Type: {content_type}").as_bytes());
                body.put_slice(CRLF);
                body.put_slice(CRLF);
                body.put_slice(blob.bytes());
            }
        }
        body.put_slice(CRLF);
    }

    body.put_slice(b"--");
    body.put_slice(boundary.as_bytes());
    body.put_slice(b"--");
    body.freeze()
}

/// The Content-Type value announcing a multipart body with `boundary`.
pub fn multipart_content_type(boundary: &str) -> String {
    protocol::format_multipart_content_type(boundary)
}

/// Encode `data` as multipart with a fresh boundary and set the matching
/// Content-Type on `headers`.
pub fn encode_multipart_into(data: &FormData, headers: &mut Headers) -> Result<Bytes> {
    let boundary = generate_boundary();
    let body = encode_multipart(data, &boundary);
    headers.set(
        constants::headers::CONTENT_TYPE,
        multipart_content_type(&boundary),
    )?;
    tracing::trace!(boundary = %boundary, fields = data.len(), "encoded multipart body");
    Ok(body)
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn decode_urlencoded(body: &str) -> FormData {
    let params = UrlSearchParams::parse(body.trim());
    FormData::from(&params)
}

/// Decode a `multipart/form-data` body delimited by `boundary`.
///
/// Each non-empty line of a part that is not a header becomes its own value
/// for the part's field name, so a value spanning several lines yields several
/// values. Parts without a `name` are skipped.
pub fn decode_multipart(body: &str, boundary: &str) -> FormData {
    let mut data = FormData::new();
    let delimiter = format!("--{boundary}");

    for part in body.split(delimiter.as_str()) {
        let mut name: Option<String> = None;

        // The first line is the remainder of the delimiter line.
        for line in part.split('\n').skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let lowered = line.to_ascii_lowercase();
            if lowered.starts_with(constants::headers::CONTENT_TYPE) {
                continue;
            }
            if lowered.starts_with(constants::headers::CONTENT_DISPOSITION) {
                name = protocol::parse_disposition_name(line).map(|n| n.replace("[]", ""));
                continue;
            }

            match &name {
                Some(name) => data.append(name.clone(), line),
                None => {
                    tracing::trace!("skipping multipart content without a field name");
                    break;
                }
            }
        }
    }

    data
}

/// Decode a form body for an explicit Content-Type.
///
/// # Errors
///
/// - [`FetchError::MissingBoundary`] for multipart without a boundary
/// - [`FetchError::UnsupportedContentType`] for any other or missing type
pub fn decode(content_type: Option<&str>, body: &str) -> Result<FormData> {
    match content_type {
        Some(ct) if protocol::is_multipart_form(ct) => {
            let boundary = protocol::parse_boundary(ct).ok_or(FetchError::MissingBoundary)?;
            Ok(decode_multipart(body, &boundary))
        }
        Some(ct) if protocol::is_form_urlencoded(ct) => Ok(decode_urlencoded(body)),
        other => Err(FetchError::UnsupportedContentType(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Decode a body using the message's Content-Type header.
///
/// Unlike [`decode`], a multipart type without a boundary yields an empty
/// [`FormData`].
pub fn decode_from_headers(headers: &Headers, body: &str) -> Result<FormData> {
    let content_type = headers.get(constants::headers::CONTENT_TYPE);
    match decode(content_type, body) {
        Err(FetchError::MissingBoundary) => {
            tracing::debug!("multipart body without boundary, decoding as empty form");
            Ok(FormData::new())
        }
        result => result,
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
