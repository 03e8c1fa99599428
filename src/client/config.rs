//! Configuration for the reqwest-backed transport.

/// Options for [`ReqwestTransport`](super::ReqwestTransport).
///
/// # Examples
///
/// ```
/// use fetch_model::client::ClientConfig;
///
/// let config = ClientConfig {
///     max_retries: 2,
///     retry_delay_ms: 250,
///     ..Default::default()
/// };
/// assert_eq!(config.request_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Idle connections kept per host.
    pub max_idle_per_host: usize,
    /// Seconds an idle pooled connection is kept.
    pub pool_idle_timeout_secs: u64,
    /// Proxy for all schemes; empty for none.
    pub proxy_url: String,
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub retry_delay_ms: u64,
    /// Log retries at `warn`.
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            request_timeout_ms: 30_000,
            max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            proxy_url: String::new(),
            max_retries: 0,
            retry_delay_ms: 1_000,
            enable_logging: true,
        }
    }
}
