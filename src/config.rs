//! client configuration
//!
//! build a [`ClientConfig`] with an endpoint and optional overrides.
//! pass it to [`crate::Client::new`] to create a client.

use crate::cache::DEFAULT_MAX_AGE;
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// configuration for the graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// graphql endpoint (e.g., "<https://api.example.com/graphql>")
    pub(crate) endpoint: Url,

    /// whether the provided endpoint parsed successfully
    pub(crate) endpoint_valid: bool,

    /// per-attempt request timeout
    pub(crate) timeout: Duration,

    /// retries after the first failed transport attempt
    pub(crate) max_retries: u32,

    /// linear backoff unit
    pub(crate) retry_base_delay: Duration,

    /// whether successful responses are cached
    pub(crate) cache_enabled: bool,

    /// how long a cached response stays fresh
    pub(crate) cache_max_age: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// additional headers to send with every request
    pub(crate) headers: HeaderMap,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// an endpoint without a scheme is treated as https.
    ///
    /// # example
    ///
    /// ```
    /// use gqlpipe::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref().trim();

        let (endpoint, endpoint_valid) =
            match Url::parse(raw).or_else(|_| Url::parse(&format!("https://{}", raw))) {
                Ok(url) if !raw.is_empty() => (url, true),
                _ => (Url::parse("https://invalid.invalid").unwrap(), false),
            };

        Self {
            raw_endpoint: raw.to_string(),
            endpoint,
            endpoint_valid,
            timeout: Duration::from_secs(30),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_BASE_DELAY,
            cache_enabled: true,
            cache_max_age: DEFAULT_MAX_AGE,
            user_agent: format!("gqlpipe/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            headers: HeaderMap::new(),
            http_client: None,
            http_client_builder: None,
        }
    }

    /// set the per-attempt request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set how many times a failed transport attempt is retried
    ///
    /// default: 3
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// set the linear backoff unit; retry `k` waits `k` times this
    ///
    /// default: 1 second
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// enable or disable response caching
    ///
    /// default: enabled
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// set how long cached responses stay fresh
    ///
    /// default: 300 seconds
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// headers configured on this client
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// graphql endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// whether response caching is enabled
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is and takes precedence over
    /// `with_http_client_builder`. tls, ssl verification and user agent come
    /// from the prebuilt client. the configured headers, the timeout and the
    /// json content-type and accept headers are still applied per request.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// customize the http client builder before the client is created.
    ///
    /// the callback receives a builder that already has the user agent and
    /// ssl settings applied. headers and timeout are set per request.
    ///
    /// ignored if `with_http_client` is also set.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// retry policy derived from this configuration
    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_base_delay(self.retry_base_delay)
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.endpoint_valid {
            return Err(Error::Config(format!(
                "invalid endpoint: {}",
                self.raw_endpoint
            )));
        }

        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                self.endpoint.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }

        if self.cache_max_age.is_zero() {
            return Err(Error::Config(
                "cache max age must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_max_age", &self.cache_max_age)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("headers", &self.headers.len())
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .finish()
    }
}
