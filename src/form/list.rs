//! Ordered multi-valued key/value containers.
//!
//! [`FormList`] is the shared shape behind [`FormData`] (text or blob values)
//! and [`UrlSearchParams`] (text values with query-string serialization).
//! Pairs keep insertion order for iteration and serialization.

use crate::types::Blob;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Ordered sequence of `(key, value)` pairs with multimap lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormList<V> {
    entries: Vec<(String, V)>,
}

/// Form fields: text or labelled binary values.
pub type FormData = FormList<FormValue>;

/// URL query parameters.
pub type UrlSearchParams = FormList<String>;

/// A single [`FormData`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Text field.
    Text(String),
    /// File field.
    File {
        /// File contents and media type.
        blob: Blob,
        /// File name sent in `Content-Disposition`.
        filename: String,
    },
}

impl FormValue {
    /// A file value sent with the given file name.
    pub fn file(blob: Blob, filename: impl Into<String>) -> Self {
        FormValue::File {
            blob,
            filename: filename.into(),
        }
    }

    /// The text of a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }

    /// Text content; file values decode their bytes as UTF-8.
    pub fn to_text(&self) -> String {
        match self {
            FormValue::Text(text) => text.clone(),
            FormValue::File { blob, .. } => String::from_utf8_lossy(blob.bytes()).into_owned(),
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

impl From<Blob> for FormValue {
    fn from(blob: Blob) -> Self {
        FormValue::file(blob, "blob")
    }
}

impl<V> FormList<V> {
    /// Create an empty container.
    pub fn new() -> Self {
        FormList {
            entries: Vec::new(),
        }
    }

    /// Add a pair at the end.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<V>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Leave exactly one pair for `key`.
    ///
    /// The first existing pair keeps its position and takes the new value;
    /// later pairs with the same key are removed. A new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<V>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((key, value)),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Every value for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&V> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, value)| value)
            .collect()
    }

    /// Whether any pair has `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove every pair with `key`.
    pub fn delete(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Iterate over `(key, value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys, repeating keys with several values.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over values.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stable sort by key, comparing UTF-16 code units.
    ///
    /// Pairs sharing a key keep their relative order.
    pub fn sort(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| compare_utf16(a, b));
    }
}

fn compare_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

impl<V> Default for FormList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, T> FromIterator<(K, T)> for FormList<V>
where
    K: Into<String>,
    T: Into<V>,
{
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut list = FormList::new();
        for (key, value) in iter {
            list.append(key, value);
        }
        list
    }
}

impl<V> IntoIterator for FormList<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl UrlSearchParams {
    /// Parse a query string, with or without a leading `?`.
    ///
    /// `+` decodes to a space, percent escapes are decoded, empty segments are
    /// skipped, and a segment without `=` becomes a key with an empty value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Build from a mapping, in key order.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Serializes as `application/x-www-form-urlencoded`.
///
/// Spaces become `+`; everything except ASCII alphanumerics and `*-._` is
/// percent-encoded, including `!'()~`.
impl fmt::Display for UrlSearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serialized = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.entries.iter())
            .finish();
        f.write_str(&serialized)
    }
}

impl From<&str> for UrlSearchParams {
    fn from(query: &str) -> Self {
        UrlSearchParams::parse(query)
    }
}

impl From<&UrlSearchParams> for FormData {
    fn from(params: &UrlSearchParams) -> Self {
        params
            .entries()
            .map(|(k, v)| (k, FormValue::Text(v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_get_all() {
        let mut form = FormData::new();
        form.append("field", "a");
        form.append("field", "b");
        form.append("other", "c");
        assert_eq!(form.get("field"), Some(&FormValue::from("a")));
        assert_eq!(
            form.get_all("field"),
            vec![&FormValue::from("a"), &FormValue::from("b")]
        );
        assert!(form.get("missing").is_none());
        assert!(form.get_all("missing").is_empty());
    }

    #[test]
    fn test_set_leaves_single_value() {
        let mut params = UrlSearchParams::parse("a=1&b=2&a=3");
        params.set("a", "9");
        assert_eq!(params.get_all("a"), vec!["9"]);
        assert_eq!(params.to_string(), "a=9&b=2");

        params.set("c", "new");
        assert_eq!(params.to_string(), "a=9&b=2&c=new");

        params.append("a", "10");
        assert_eq!(params.get_all("a"), vec!["9", "10"]);
    }

    #[test]
    fn test_delete_and_has() {
        let mut params = UrlSearchParams::parse("a=1&b=2&a=3");
        assert!(params.has("a"));
        params.delete("a");
        assert!(!params.has("a"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let params = UrlSearchParams::parse("z=1&y=2&z=3");
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["z", "y", "z"]);
        assert_eq!(
            params.values().map(String::as_str).collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
    }

    #[test]
    fn test_parse_query_forms() {
        assert_eq!(UrlSearchParams::parse("").to_string(), "");
        assert_eq!(UrlSearchParams::parse("a=b").to_string(), "a=b");
        assert_eq!(UrlSearchParams::parse("?a=b").to_string(), "a=b");

        let params = UrlSearchParams::parse("a=b&c");
        assert!(params.has("c"));
        assert_eq!(params.get("c").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_decodes() {
        let params = UrlSearchParams::parse("&a&&& &&&&&a+b=& c&m%c3%b8%c3%b8");
        assert!(params.has("a"));
        assert!(params.has("a b"));
        assert!(params.has(" "));
        assert!(!params.has("c"));
        assert!(params.has(" c"));
        assert!(params.has("møø"));
    }

    #[test]
    fn test_to_string_escaping() {
        let mut params = UrlSearchParams::new();
        params.append("q", "a b!'()~*-._");
        assert_eq!(params.to_string(), "q=a+b%21%27%28%29%7E*-._");

        let mut params = UrlSearchParams::new();
        params.append("a=b", "c&d");
        assert_eq!(params.to_string(), "a%3Db=c%26d");
    }

    #[test]
    fn test_multi_value_serialization() {
        assert_eq!(UrlSearchParams::parse("a=1&a=2").to_string(), "a=1&a=2");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut params = UrlSearchParams::parse("b=1&a=2");
        params.sort();
        assert_eq!(params.to_string(), "a=2&b=1");

        let mut params = UrlSearchParams::parse("z=b&a=b&z=a&a=a");
        params.sort();
        assert_eq!(params.to_string(), "a=b&a=a&z=b&z=a");
    }

    #[test]
    fn test_sort_uses_utf16_order() {
        // U+FFFD sorts after U+1F600 in UTF-16 (surrogates are 0xD83D...).
        let mut params = UrlSearchParams::new();
        params.append("\u{fffd}", "1");
        params.append("\u{1f600}", "2");
        params.sort();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["\u{1f600}", "\u{fffd}"]
        );
    }

    #[test]
    fn test_construction_from_pairs_and_map() {
        let from_pairs: UrlSearchParams = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(from_pairs.to_string(), "a=1&b=2");

        let mut map = BTreeMap::new();
        map.insert("y".to_string(), "2".to_string());
        map.insert("x".to_string(), "1".to_string());
        assert_eq!(UrlSearchParams::from_map(&map).to_string(), "x=1&y=2");

        let copy = from_pairs.clone();
        assert_eq!(copy, from_pairs);
    }

    #[test]
    fn test_form_values() {
        let blob = Blob::new("bytes", "application/octet-stream");
        let mut form = FormData::new();
        form.append("file", blob.clone());
        form.append("name", "x");

        match form.get("file") {
            Some(FormValue::File { blob: stored, filename }) => {
                assert_eq!(stored, &blob);
                assert_eq!(filename, "blob");
            }
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(form.get("name").and_then(FormValue::as_text), Some("x"));
        assert_eq!(form.get("file").map(FormValue::to_text).as_deref(), Some("bytes"));
    }

    #[test]
    fn test_form_data_from_search_params() {
        let params = UrlSearchParams::parse("a=1&a=2");
        let form = FormData::from(&params);
        assert_eq!(
            form.get_all("a"),
            vec![&FormValue::from("1"), &FormValue::from("2")]
        );
    }
}
