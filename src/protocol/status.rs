//! HTTP status codes: reason phrases and the status classes the model cares about.
//!
//! | Class | Codes | Effect |
//! |-------|-------|--------|
//! | Null-body | 101, 103, 204, 205, 304 | `Response` body forced to absent |
//! | Redirect | 301, 302, 303, 307, 308 | accepted by `Response::redirect` |
//! | Ok | 200–299 | `Response::ok()` |

/// Statuses for which a response never carries a body.
pub const NULL_BODY_STATUSES: [u16; 5] = [101, 103, 204, 205, 304];

/// Statuses accepted by [`crate::Response::redirect`].
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Whether `status` forbids a response body.
#[inline]
pub fn is_null_body_status(status: u16) -> bool {
    NULL_BODY_STATUSES.contains(&status)
}

/// Whether `status` is a valid redirect status.
#[inline]
pub fn is_redirect_status(status: u16) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

/// Whether `status` is in the 2xx range.
#[inline]
pub fn is_ok_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Reason phrase for `status`, or `None` for unregistered codes.
///
/// # Examples
///
/// ```
/// use fetch_model::protocol::status::status_text;
///
/// assert_eq!(status_text(404), Some("Not Found"));
/// assert_eq!(status_text(418), Some("I'm a teapot"));
/// assert_eq!(status_text(299), None);
/// ```
pub fn status_text(status: u16) -> Option<&'static str> {
    let text = match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "Unused",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };
    Some(text)
}
