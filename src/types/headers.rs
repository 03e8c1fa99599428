//! Case-insensitive, ordered HTTP header store.
//!
//! [`Headers`] keeps `(name, value)` pairs in insertion order with names
//! lowercased. Appending a name that already exists concatenates the values
//! with `", "` instead of adding a second entry, so every name appears at most
//! once.
//!
//! # Examples
//!
//! ```
//! use fetch_model::Headers;
//!
//! let mut headers = Headers::new();
//! headers.append("Accept-Encoding", "deflate").unwrap();
//! headers.append("accept-encoding", "gzip").unwrap();
//! assert_eq!(headers.get("ACCEPT-ENCODING"), Some("deflate, gzip"));
//!
//! assert!(headers.append("bad name", "x").is_err());
//! ```

use crate::error::{FetchError, Result};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{BTreeMap, HashMap};

/// Ordered, case-insensitive header multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

/// Initializer accepted by [`Headers::from_init`] and message constructors.
#[derive(Debug, Clone)]
pub enum HeadersInit {
    /// Copy of an existing store.
    Headers(Headers),
    /// Ordered name/value tuples.
    Pairs(Vec<(String, String)>),
    /// Ordered name/value lists; every inner list must have exactly two elements.
    List(Vec<Vec<String>>),
    /// Plain mapping.
    Map(BTreeMap<String, String>),
}

impl Headers {
    /// Create an empty header store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a header store from an initializer.
    ///
    /// # Errors
    ///
    /// [`FetchError::InvalidHeaderName`] for any invalid name, and
    /// [`FetchError::InvalidHeaderInit`] for a list entry that is not a pair.
    pub fn from_init(init: impl Into<HeadersInit>) -> Result<Self> {
        let mut headers = Headers::new();
        match init.into() {
            HeadersInit::Headers(other) => {
                for (name, value) in other.entries {
                    headers.append(name, value)?;
                }
            }
            HeadersInit::Pairs(pairs) => {
                for (name, value) in pairs {
                    headers.append(name, value)?;
                }
            }
            HeadersInit::List(list) => {
                for entry in list {
                    match <[String; 2]>::try_from(entry) {
                        Ok([name, value]) => headers.append(name, value)?,
                        Err(entry) => return Err(FetchError::InvalidHeaderInit(entry.len())),
                    }
                }
            }
            HeadersInit::Map(map) => {
                for (name, value) in map {
                    headers.append(name, value)?;
                }
            }
        }
        Ok(headers)
    }

    /// Build a header store from a serialized mapping, as returned by a transport.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        Self::from_init(HeadersInit::Map(map.clone()))
    }

    /// Append a value, joining it onto an existing value with `", "`.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl ToString) -> Result<()> {
        let name = normalize_name(name.as_ref())?;
        let value = value.to_string();

        match self.position(&name) {
            Some(index) => {
                let existing = &mut self.entries[index].1;
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Replace any existing value for `name`.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl ToString) -> Result<()> {
        let name = normalize_name(name.as_ref())?;
        let value = value.to_string();

        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Value stored for `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a value is stored for `name`.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the value stored for `name`, if any.
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    ///
    /// Each call starts a fresh iterator over the current contents.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Iterate over header names.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over header values.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize into a name-to-value mapping.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().cloned().collect()
    }

    /// Convert into an [`http::HeaderMap`].
    ///
    /// # Errors
    ///
    /// [`FetchError::InvalidHeaderValue`] when a value contains bytes that are
    /// not allowed on the wire.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FetchError::InvalidHeaderName(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| FetchError::InvalidHeaderValue(name.clone()))?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }

    fn position(&self, normalized: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == normalized)
    }
}

/// Validate a header name against the token grammar and lowercase it.
fn normalize_name(name: &str) -> Result<String> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|header_name| header_name.as_str().to_string())
        .map_err(|_| FetchError::InvalidHeaderName(name.to_string()))
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map {
            let value = String::from_utf8_lossy(value.as_bytes());
            // HeaderName is already a valid, lowercased token.
            match headers.position(name.as_str()) {
                Some(index) => {
                    let existing = &mut headers.entries[index].1;
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                None => headers.entries.push((name.as_str().to_string(), value.into_owned())),
            }
        }
        headers
    }
}

impl From<Headers> for HeadersInit {
    fn from(headers: Headers) -> Self {
        HeadersInit::Headers(headers)
    }
}

impl From<&Headers> for HeadersInit {
    fn from(headers: &Headers) -> Self {
        HeadersInit::Headers(headers.clone())
    }
}

impl From<Vec<(String, String)>> for HeadersInit {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeadersInit::Pairs(pairs)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for HeadersInit {
    fn from(pairs: [(&str, &str); N]) -> Self {
        HeadersInit::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<Vec<String>>> for HeadersInit {
    fn from(list: Vec<Vec<String>>) -> Self {
        HeadersInit::List(list)
    }
}

impl From<BTreeMap<String, String>> for HeadersInit {
    fn from(map: BTreeMap<String, String>) -> Self {
        HeadersInit::Map(map)
    }
}

impl From<HashMap<String, String>> for HeadersInit {
    fn from(map: HashMap<String, String>) -> Self {
        HeadersInit::Map(map.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_then_get() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "application/json").unwrap();
        assert_eq!(headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn test_append_concatenates_case_insensitively() {
        let mut headers = Headers::new();
        headers.append("Accept-Encoding", "deflate").unwrap();
        headers.append("ACCEPT-ENCODING", "gzip").unwrap();
        assert_eq!(headers.get("accept-encoding"), Some("deflate, gzip"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_append_coerces_values() {
        let mut headers = Headers::new();
        headers.append("Content-Length", 42).unwrap();
        assert_eq!(headers.get("content-length"), Some("42"));
    }

    #[test]
    fn test_set_replaces() {
        let mut headers = Headers::new();
        headers.append("X-Trace", "a").unwrap();
        headers.append("X-Trace", "b").unwrap();
        headers.set("x-trace", "c").unwrap();
        assert_eq!(headers.get("X-Trace"), Some("c"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut headers = Headers::new();
        for name in ["", "bad name", "colon:", "quote\"", "tab\t"] {
            let err = headers.append(name, "v").unwrap_err();
            assert!(matches!(err, FetchError::InvalidHeaderName(_)), "{name:?}");
            assert!(headers.set(name, "v").is_err());
        }
        assert!(headers.is_empty());
    }

    #[test]
    fn test_token_punctuation_accepted() {
        let mut headers = Headers::new();
        headers.append("x-#$%&'*+.^_`|~!", "ok").unwrap();
        assert!(headers.has("X-#$%&'*+.^_`|~!"));
    }

    #[test]
    fn test_has_and_delete() {
        let mut headers = Headers::new();
        headers.append("Authorization", "Bearer 12345").unwrap();
        assert!(headers.has("AUTHORIZATION"));
        headers.delete("authorization");
        assert!(!headers.has("Authorization"));
        assert_eq!(headers.get("authorization"), None);
    }

    #[test]
    fn test_iteration_reflects_current_state() {
        let mut headers = Headers::new();
        headers.append("A", "1").unwrap();
        headers.append("B", "2").unwrap();
        assert_eq!(headers.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        headers.delete("a");
        headers.append("C", "3").unwrap();
        assert_eq!(
            headers.entries().collect::<Vec<_>>(),
            vec![("b", "2"), ("c", "3")]
        );
        assert_eq!(headers.values().collect::<Vec<_>>(), vec!["2", "3"]);
    }

    #[test]
    fn test_init_variants() {
        let from_pairs = Headers::from_init([
            ("Content-Type", "application/json"),
            ("Authorization", "Bearer 12345"),
        ])
        .unwrap();
        assert_eq!(
            from_pairs.entries().collect::<Vec<_>>(),
            vec![
                ("content-type", "application/json"),
                ("authorization", "Bearer 12345")
            ]
        );

        let copied = Headers::from_init(&from_pairs).unwrap();
        assert_eq!(copied, from_pairs);

        let mut map = BTreeMap::new();
        map.insert("X-Key".to_string(), "v".to_string());
        let from_map = Headers::from_init(map).unwrap();
        assert_eq!(from_map.get("x-key"), Some("v"));
    }

    #[test]
    fn test_list_init_requires_pairs() {
        let good = vec![vec!["A".to_string(), "1".to_string()]];
        assert!(Headers::from_init(good).is_ok());

        let bad = vec![vec!["A".to_string(), "1".to_string(), "2".to_string()]];
        let err = Headers::from_init(bad).unwrap_err();
        assert!(matches!(err, FetchError::InvalidHeaderInit(3)));

        let short = vec![vec!["A".to_string()]];
        assert!(matches!(
            Headers::from_init(short),
            Err(FetchError::InvalidHeaderInit(1))
        ));
    }

    #[test]
    fn test_header_map_round_trip() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain").unwrap();
        headers.append("Vary", "Accept").unwrap();
        headers.append("Vary", "Origin").unwrap();

        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get("vary").unwrap(), "Accept, Origin");

        let back = Headers::from(&map);
        assert_eq!(back.get("content-type"), Some("text/plain"));
        assert_eq!(back.get("vary"), Some("Accept, Origin"));
    }

    #[test]
    fn test_header_map_rejects_bad_values() {
        let mut headers = Headers::new();
        headers.append("X-Bad", "line\nbreak").unwrap();
        assert!(matches!(
            headers.to_header_map(),
            Err(FetchError::InvalidHeaderValue(_))
        ));
    }

    #[test]
    fn test_to_map() {
        let headers = Headers::from_init([("B", "2"), ("A", "1")]).unwrap();
        let map = headers.to_map();
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
        assert_eq!(map.len(), 2);
    }
}
