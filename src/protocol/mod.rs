//! Protocol constants, status codes, and header value parsing.
//!
//! # Module Organization
//!
//! ```text
//! protocol/
//! ├── constants - Header names, media types, method lists
//! ├── headers   - Content-Type parsing (boundary, essence, disposition name)
//! └── status    - Reason phrases and null-body / redirect / ok classes
//! ```

pub mod constants;
pub mod headers;
pub mod status;

pub use headers::{
    format_multipart_content_type, is_form_urlencoded, is_multipart_form, media_type_essence,
    parse_boundary, parse_disposition_name,
};
pub use status::{is_null_body_status, is_ok_status, is_redirect_status, status_text};
