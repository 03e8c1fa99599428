#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # fetch_model: the Fetch API message model
//!
//! This crate models an HTTP request/response exchange independently of any
//! network stack: [`Headers`], [`Request`], [`Response`], the
//! single-consumption body protocol they share, and the codecs between
//! structured form data and `application/x-www-form-urlencoded` /
//! `multipart/form-data` bytes.
//!
//! ## Overview
//!
//! 1. **Headers** - ordered, case-insensitive, values combined with `", "`
//! 2. **Bodies** - text, bytes, blobs, forms or streams, readable exactly once
//! 3. **Messages** - requests with fetch directives, responses with status rules
//! 4. **Form codecs** - urlencoded and multipart encode/decode
//!
//! Network I/O is delegated to a [`client::Transport`]; a `reqwest`-backed
//! [`client::ReqwestTransport`] is included.
//!
//! ## Key Features
//!
//! - **Single consumption**: every body reader fails with
//!   [`FetchError::BodyAlreadyUsed`] after the first read
//! - **Content-Type inference**: text, blob and search-param bodies label themselves
//! - **Null-body statuses**: 101, 103, 204, 205 and 304 never carry a body
//! - **Multipart boundaries**: generated per encode and written back to `Content-Type`
//! - **Cache busting**: `no-store` / `no-cache` GET and HEAD requests refresh a `_=` parameter
//! - **Streaming bodies**: [`ByteStream`] chunks, drained once, teed on clone
//!
//! ## Reading a Form Body
//!
//! ```
//! use fetch_model::{FormData, FormValue, Request, RequestInit};
//!
//! # tokio_test::block_on(async {
//! let mut form = FormData::new();
//! form.append("name", "world");
//!
//! let mut request = Request::new(
//!     "https://example.com/upload",
//!     RequestInit {
//!         method: Some("POST".into()),
//!         body: Some(form.into()),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! // Encoding writes the multipart boundary into Content-Type.
//! let text = request.text().await.unwrap();
//! let content_type = request.headers().get("content-type").unwrap();
//! let decoded = fetch_model::form::decode(Some(content_type), &text).unwrap();
//! assert_eq!(decoded.get("name"), Some(&FormValue::from("world")));
//! # });
//! ```
//!
//! ## Fetching
//!
//! ```no_run
//! use fetch_model::client::{fetch, ReqwestTransport};
//! use fetch_model::{Request, RequestInit};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestTransport::new()?;
//!     let request = Request::new("https://example.com/data.json", RequestInit::default())?;
//!     let mut response = fetch(&transport, request).await?;
//!
//!     let value: serde_json::Value = response.json().await?;
//!     println!("{value}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Headers, Blob, ByteStream, AbortSignal, Url
//! - **[form]** - FormData / UrlSearchParams and their codecs
//! - **[body]** - The shared body protocol
//! - **[request]** / **[response]** - Message models
//! - **[client]** - Transport seam, `fetch`, reqwest transport
//! - **[protocol]** - Constants, Content-Type parsing, status codes
//! - **[error]** - Error types and result handling

pub mod body;
pub mod client;
pub mod error;
pub mod form;
pub mod protocol;
pub mod request;
pub mod response;
pub mod types;

pub use body::{Body, BodyInit, BodyState};
pub use client::fetch;
pub use error::{FetchError, Result};
pub use form::{FormData, FormValue, UrlSearchParams};
pub use request::{
    Request, RequestCache, RequestCredentials, RequestInit, RequestMode, RequestRedirect,
};
pub use response::{Response, ResponseInit, ResponseType};
pub use types::{
    AbortController, AbortSignal, Blob, BlobPart, ByteStream, Headers, HeadersInit, StreamWriter,
    Url,
};
