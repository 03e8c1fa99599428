//! Form containers and their wire encodings.
//!
//! # Module Organization
//!
//! ```text
//! form/
//! ├── list  - FormList<V>, FormData, UrlSearchParams
//! └── codec - urlencoded / multipart encode and decode
//! ```

pub mod codec;
pub mod list;

pub use codec::{
    decode, decode_from_headers, decode_multipart, decode_urlencoded, encode_form_urlencoded,
    encode_multipart, encode_multipart_into, encode_urlencoded, generate_boundary,
    multipart_content_type,
};
pub use list::{FormData, FormList, FormValue, UrlSearchParams};
