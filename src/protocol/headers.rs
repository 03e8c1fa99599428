//! Content-Type parsing and formatting.
//!
//! The form codec dispatches on the `Content-Type` header, and multipart bodies
//! carry their delimiter in its `boundary` parameter.
//!
//! # Header Formats
//!
//! | Header value | Parsed as |
//! |--------------|-----------|
//! | `multipart/form-data; boundary=XyZ` | essence `multipart/form-data`, boundary `XyZ` |
//! | `multipart/form-data; boundary="a b"` | boundary `a b` |
//! | `application/x-www-form-urlencoded;charset=UTF-8` | essence `application/x-www-form-urlencoded` |
//!
//! # Examples
//!
//! ```
//! use fetch_model::protocol::{parse_boundary, format_multipart_content_type, media_type_essence};
//!
//! assert_eq!(parse_boundary("multipart/form-data; boundary=abc").as_deref(), Some("abc"));
//! assert_eq!(format_multipart_content_type("abc"), "multipart/form-data; boundary=abc");
//! assert_eq!(media_type_essence("Text/Plain; charset=UTF-8"), "text/plain");
//! ```

use super::constants::media_types;

/// Extract the `boundary` parameter from a Content-Type value.
///
/// Splits on `;`, picks the first segment containing `boundary=`, and takes
/// everything after its first `=`, trimmed of whitespace and surrounding quotes.
///
/// # Returns
///
/// `None` when no segment carries a boundary or the boundary is empty.
///
/// # Examples
///
/// ```
/// use fetch_model::protocol::parse_boundary;
///
/// assert_eq!(
///     parse_boundary("multipart/form-data; boundary=----FormBoundaryabc").as_deref(),
///     Some("----FormBoundaryabc"),
/// );
/// assert_eq!(parse_boundary("multipart/form-data"), None);
/// ```
pub fn parse_boundary(content_type: &str) -> Option<String> {
    let segment = content_type
        .split(';')
        .find(|segment| segment.contains("boundary="))?;

    let (_, value) = segment.split_once('=')?;
    let boundary = value.trim().trim_matches('"');

    if boundary.is_empty() {
        None
    } else {
        Some(boundary.to_string())
    }
}

/// Format the Content-Type value for a multipart body.
#[inline]
pub fn format_multipart_content_type(boundary: &str) -> String {
    format!("{}; boundary={}", media_types::MULTIPART_FORM_DATA, boundary)
}

/// The lowercased `type/subtype` portion of a Content-Type value.
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a Content-Type value names `multipart/form-data`.
pub fn is_multipart_form(content_type: &str) -> bool {
    media_type_essence(content_type) == media_types::MULTIPART_FORM_DATA
}

/// Whether a Content-Type value names `application/x-www-form-urlencoded`.
pub fn is_form_urlencoded(content_type: &str) -> bool {
    media_type_essence(content_type) == media_types::FORM_URLENCODED
}

/// Extract the `name="..."` parameter from a Content-Disposition line.
///
/// The parameter must be preceded by whitespace or `;`, so `filename="..."`
/// is never mistaken for the field name.
pub fn parse_disposition_name(line: &str) -> Option<String> {
    let mut rest = line;
    while let Some(pos) = rest.find("name=\"") {
        let preceded_by_separator = rest[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace() || c == ';');
        let after = &rest[pos + "name=\"".len()..];
        if preceded_by_separator {
            let end = after.find('"')?;
            return Some(after[..end].to_string());
        }
        rest = after;
    }
    None
}
