//! Header names and media types used by the message model.

/// Header names, stored lowercased as [`crate::Headers`] stores them.
pub mod headers {
    /// `content-type`
    pub const CONTENT_TYPE: &str = "content-type";
    /// `location`
    pub const LOCATION: &str = "location";
    /// `content-disposition`
    pub const CONTENT_DISPOSITION: &str = "content-disposition";
}

/// Media types inferred for bodies or dispatched on by the form codec.
pub mod media_types {
    /// Plain text bodies.
    pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";
    /// URL-encoded form bodies.
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    /// URL-encoded form bodies, as inferred for `UrlSearchParams`.
    pub const FORM_URLENCODED_UTF8: &str = "application/x-www-form-urlencoded;charset=UTF-8";
    /// Multipart form bodies.
    pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
    /// JSON bodies.
    pub const APPLICATION_JSON: &str = "application/json";
}

/// Canonical methods that are uppercased during normalization.
pub const NORMALIZED_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// Methods a `Request` refuses to represent.
pub const FORBIDDEN_METHODS: [&str; 3] = ["CONNECT", "TRACE", "TRACK"];

/// Prefix of generated multipart boundaries.
pub const BOUNDARY_PREFIX: &str = "----FormBoundary";

/// Query parameter appended to cache-busted GET/HEAD URLs.
pub const CACHE_BUST_PARAM: &str = "_";
