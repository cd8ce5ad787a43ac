//! main client
//!
//! `execute` composes the pipeline: cache lookup, query shape check, the
//! retry loop around the http post, response parsing, and cache store.
//! typed helpers on top of it turn response errors into `Err`.

use crate::cache::CacheStore;
use crate::config::ClientConfig;
use crate::error::{Error, Result, INVALID_QUERY_MESSAGE};
use crate::graphql::GraphQlResponse;
use crate::operation::Operation;
use crate::parser::parse_response;
use crate::request::GraphQlRequest;
use parking_lot::RwLock;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

const OPERATION_KEYWORDS: [&str; 3] = ["query", "mutation", "subscription"];

/// graphql client with response caching and retries
///
/// clones share the cache and the transport handle.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: Arc<RwLock<Option<reqwest::Client>>>,
    cache: Arc<CacheStore>,
}

impl Client {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = match &config.http_client {
            Some(http) => http.clone(),
            None => {
                let mut builder = reqwest::Client::builder()
                    .user_agent(config.user_agent.clone())
                    .danger_accept_invalid_certs(!config.verify_ssl);
                if let Some(customize) = &config.http_client_builder {
                    builder = customize(builder);
                }
                builder.build()?
            }
        };

        Ok(Self::with_http(config, http))
    }

    fn with_http(config: ClientConfig, http: reqwest::Client) -> Self {
        let cache = CacheStore::new(config.cache_max_age);
        Self {
            config: Arc::new(config),
            http: Arc::new(RwLock::new(Some(http))),
            cache: Arc::new(cache),
        }
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// access the response cache
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// execute a request
    ///
    /// never fails: validation, transport, status, and parse failures come
    /// back as a single entry in [`GraphQlResponse::errors`].
    pub async fn execute(&self, request: &GraphQlRequest) -> GraphQlResponse {
        self.execute_with(request, |url, body| {
            post_json(self.http.read().clone(), &self.config, url, body)
        })
        .await
    }

    /// execute a request and deserialize `data` into `T`
    ///
    /// any response error is returned as [`Error::GraphQl`], even with
    /// partial data present.
    pub async fn execute_as<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T> {
        let response = self.execute(request).await;
        if response.has_errors() {
            return Err(Error::from_graphql_errors(response.errors));
        }
        let data = response.data.unwrap_or_default();
        Ok(serde_json::from_value(data)?)
    }

    /// execute a request and deserialize a single top-level field
    ///
    /// a missing or null field is reported with the first response error,
    /// or [`Error::MissingField`] if the server sent none.
    pub async fn fetch_field<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
        field: &str,
    ) -> Result<T> {
        let mut response = self.execute(request).await;
        let value = response
            .data
            .as_mut()
            .and_then(|data| data.get_mut(field))
            .map(serde_json::Value::take)
            .filter(|value| !value.is_null());

        match value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None if response.has_errors() => Err(Error::from_graphql_errors(response.errors)),
            None => Err(Error::MissingField(field.to_string())),
        }
    }

    /// execute a typed operation
    pub async fn execute_operation<O: Operation>(
        &self,
        variables: serde_json::Value,
    ) -> Result<O::Response> {
        let mut request = GraphQlRequest::new(O::QUERY).with_variables(variables);
        if let Some(name) = O::OPERATION_NAME {
            request = request.with_operation_name(name);
        }
        self.execute_as(&request).await
    }

    /// release the transport handle
    ///
    /// the cache is kept. every later network attempt, including retries of
    /// requests already in flight, fails with a terminal `CLIENT_CLOSED` error.
    pub fn close(&self) {
        if self.http.write().take().is_some() {
            debug!("graphql client closed");
        }
    }

    /// true once [`Client::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.http.read().is_none()
    }

    /// drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// drop the cached response for a request; returns true if one existed
    pub fn remove_cache_entry(&self, request: &GraphQlRequest) -> bool {
        self.cache.remove(&CacheStore::key(request))
    }
}

/// shallow shape check: non-empty and names an operation keyword
pub(crate) fn is_valid_query(query: &str) -> bool {
    let query = query.trim().to_lowercase();
    !query.is_empty() && OPERATION_KEYWORDS.iter().any(|kw| query.contains(kw))
}

/// one transport attempt; `None` means the client was closed
async fn post_json(
    http: Option<reqwest::Client>,
    config: &ClientConfig,
    url: Url,
    body: serde_json::Value,
) -> Result<(StatusCode, String)> {
    let http = http.ok_or(Error::Closed)?;
    let response = http
        .post(url)
        .headers(config.headers.clone())
        .timeout(config.timeout)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .json(&body)
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}

fn check_status(status: StatusCode, text: String) -> Result<String> {
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

impl Client {
    pub(crate) async fn execute_with<F, Fut>(
        &self,
        request: &GraphQlRequest,
        mut send: F,
    ) -> GraphQlResponse
    where
        F: FnMut(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let key = CacheStore::key(request);
        if self.config.cache_enabled {
            if let Some(cached) = self.cache.get(&key) {
                debug!("graphql cache hit");
                return cached;
            }
            trace!("graphql cache miss");
        }

        if !is_valid_query(request.query()) {
            debug!("rejecting malformed graphql query");
            return GraphQlResponse::from_error(
                Error::Validation(INVALID_QUERY_MESSAGE.to_string()).to_graphql_error(),
            );
        }

        let url = self.config.endpoint.clone();
        let body = request.to_payload();
        let outcome = self
            .config
            .retry_policy()
            .run(|| {
                let attempt = send(url.clone(), body.clone());
                async move {
                    let (status, text) = attempt.await?;
                    check_status(status, text)
                }
            })
            .await
            .and_then(|text| parse_response(&text));

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(code = err.code(), error = %err, "graphql request failed");
                return GraphQlResponse::from_error(err.to_graphql_error());
            }
        };

        if self.config.cache_enabled && response.is_success() {
            self.cache.put(key, response.clone());
            debug!("graphql response cached");
        }

        response
    }
}
