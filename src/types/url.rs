//! URL values with component accessors and synchronized search params.
//!
//! Parsing and normalization are delegated to the [`url`](::url) crate; this
//! wrapper exposes the component-wise getters and setters of the web `URL`
//! interface and keeps a [`UrlSearchParams`] view in sync with the query.
//!
//! # Examples
//!
//! ```
//! use fetch_model::Url;
//!
//! let mut url = Url::parse("https://example.com/a?x=1", None).unwrap();
//! url.search_params_mut().append("y", "2 3");
//! assert_eq!(url.href(), "https://example.com/a?x=1&y=2+3");
//! assert_eq!(url.search_params().get("y").map(String::as_str), Some("2 3"));
//! ```

use crate::error::{FetchError, Result};
use crate::form::UrlSearchParams;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A parsed, normalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    inner: ::url::Url,
}

impl Url {
    /// Parse `input`, optionally relative to `base`.
    ///
    /// Tabs and newlines are stripped and surrounding whitespace trimmed first.
    pub fn parse(input: &str, base: Option<&str>) -> Result<Self> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
            .collect();

        let inner = match base {
            Some(base) => ::url::Url::parse(base)?.join(&cleaned)?,
            None => ::url::Url::parse(&cleaned)?,
        };
        Ok(Url { inner })
    }

    /// The serialized URL.
    pub fn href(&self) -> &str {
        self.inner.as_str()
    }

    /// Replace the whole URL.
    pub fn set_href(&mut self, href: &str) -> Result<()> {
        self.inner = ::url::Url::parse(href)?;
        Ok(())
    }

    /// Scheme followed by `:`.
    pub fn protocol(&self) -> String {
        format!("{}:", self.inner.scheme())
    }

    /// Change the scheme; a trailing `:` is ignored.
    pub fn set_protocol(&mut self, protocol: &str) -> Result<()> {
        let scheme = protocol.trim_end_matches(':');
        self.inner
            .set_scheme(scheme)
            .map_err(|_| invalid_component("protocol", protocol))
    }

    /// Username, possibly empty.
    pub fn username(&self) -> &str {
        self.inner.username()
    }

    /// Set the username.
    pub fn set_username(&mut self, username: &str) -> Result<()> {
        self.inner
            .set_username(username)
            .map_err(|_| invalid_component("username", username))
    }

    /// Password, possibly empty.
    pub fn password(&self) -> &str {
        self.inner.password().unwrap_or_default()
    }

    /// Set the password.
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        let password = (!password.is_empty()).then_some(password);
        self.inner
            .set_password(password)
            .map_err(|_| invalid_component("password", password.unwrap_or_default()))
    }

    /// Host name with `:port` when a non-default port is set.
    pub fn host(&self) -> String {
        match self.inner.port() {
            Some(port) => format!("{}:{}", self.hostname(), port),
            None => self.hostname().to_string(),
        }
    }

    /// Set host, and port when `host` contains `:port`.
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        match host.rsplit_once(':') {
            Some((name, port)) if !name.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
                self.inner.set_host(Some(name))?;
                self.set_port(port)
            }
            _ => {
                self.inner.set_host(Some(host))?;
                Ok(())
            }
        }
    }

    /// Host name without port.
    pub fn hostname(&self) -> &str {
        self.inner.host_str().unwrap_or_default()
    }

    /// Set the host name, keeping the port.
    pub fn set_hostname(&mut self, hostname: &str) -> Result<()> {
        self.inner.set_host(Some(hostname))?;
        Ok(())
    }

    /// Port as text, empty when the scheme default applies.
    pub fn port(&self) -> String {
        self.inner.port().map(|p| p.to_string()).unwrap_or_default()
    }

    /// Set the port; an empty string restores the default.
    pub fn set_port(&mut self, port: &str) -> Result<()> {
        let parsed = if port.is_empty() {
            None
        } else {
            Some(
                port.parse::<u16>()
                    .map_err(|_| invalid_component("port", port))?,
            )
        };
        self.inner
            .set_port(parsed)
            .map_err(|_| invalid_component("port", port))
    }

    /// Path component.
    pub fn pathname(&self) -> &str {
        self.inner.path()
    }

    /// Set the path component.
    pub fn set_pathname(&mut self, pathname: &str) {
        self.inner.set_path(pathname);
    }

    /// Query prefixed with `?`, or empty.
    pub fn search(&self) -> String {
        match self.inner.query() {
            Some(query) if !query.is_empty() => format!("?{query}"),
            _ => String::new(),
        }
    }

    /// Set the query; a leading `?` is ignored and an empty value clears it.
    pub fn set_search(&mut self, search: &str) {
        let query = search.strip_prefix('?').unwrap_or(search);
        self.inner.set_query((!query.is_empty()).then_some(query));
    }

    /// Fragment prefixed with `#`, or empty.
    pub fn hash(&self) -> String {
        match self.inner.fragment() {
            Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
            _ => String::new(),
        }
    }

    /// Set the fragment; a leading `#` is ignored and an empty value clears it.
    pub fn set_hash(&mut self, hash: &str) {
        let fragment = hash.strip_prefix('#').unwrap_or(hash);
        self.inner.set_fragment((!fragment.is_empty()).then_some(fragment));
    }

    /// ASCII serialization of the origin (`null` for opaque origins).
    pub fn origin(&self) -> String {
        self.inner.origin().ascii_serialization()
    }

    /// Snapshot of the query as search params.
    pub fn search_params(&self) -> UrlSearchParams {
        UrlSearchParams::parse(self.inner.query().unwrap_or_default())
    }

    /// Mutable search params; the query is rewritten when the guard drops.
    pub fn search_params_mut(&mut self) -> SearchParamsMut<'_> {
        let params = self.search_params();
        SearchParamsMut { url: self, params }
    }

    /// The underlying parsed URL.
    pub fn as_url(&self) -> &::url::Url {
        &self.inner
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href())
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        self.href()
    }
}

impl From<&Url> for String {
    fn from(url: &Url) -> Self {
        url.href().to_string()
    }
}

impl From<Url> for String {
    fn from(url: Url) -> Self {
        url.inner.into()
    }
}

impl std::str::FromStr for Url {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s, None)
    }
}

/// Write-back guard returned by [`Url::search_params_mut`].
pub struct SearchParamsMut<'a> {
    url: &'a mut Url,
    params: UrlSearchParams,
}

impl Deref for SearchParamsMut<'_> {
    type Target = UrlSearchParams;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

impl DerefMut for SearchParamsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.params
    }
}

impl Drop for SearchParamsMut<'_> {
    fn drop(&mut self) {
        let query = self.params.to_string();
        self.url.set_search(&query);
    }
}

fn invalid_component(component: &'static str, value: &str) -> FetchError {
    FetchError::InvalidUrlComponent {
        component,
        value: value.to_string(),
    }
}
