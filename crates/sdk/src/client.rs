//! Main client for the Flock SDK.

use crate::api::{BackgroundChecksApi, PeopleApi};
use crate::config::{ClientConfig, Credentials, RateLimitConfig, RetryConfig};
use crate::error::{Error, FlockResult};
use crate::transport::HttpTransport;
use chrono::{NaiveDate, Utc};
use flock_core::document::{Document, NextPage, PrimaryData, Resource};
use flock_core::limiter::RateLimiter;
use flock_core::query::Query;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Ceiling on pages fetched by [`FlockClient::fetch_all`] when the caller
/// does not pass one. Deliberately conservative: an unattended agent
/// walking an unbounded collection should stop early rather than drain the
/// rate-limit window.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Client for a JSON:API people directory.
///
/// One instance is shared across all tool invocations; its rate limiter is
/// the only process-wide mutable state.
#[derive(Clone, Debug)]
pub struct FlockClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl FlockClient {
    /// Create a new client builder.
    pub fn builder() -> FlockClientBuilder {
        FlockClientBuilder::new()
    }

    /// Create a client from configuration, with an optional externally
    /// owned limiter (tests inject one with a controlled clock).
    fn from_config(
        config: ClientConfig,
        limiter: Option<Arc<RateLimiter>>,
    ) -> FlockResult<Self> {
        let limiter = limiter.unwrap_or_else(|| {
            Arc::new(RateLimiter::new(
                config.rate_limit.limit,
                config.rate_limit.window,
            ))
        });
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone(), limiter)?;
        Ok(Self { config, http })
    }

    /// Whether credentials are configured. When false the client is in
    /// degraded demo mode and every call fails `Unauthenticated`.
    pub fn is_authenticated(&self) -> bool {
        self.config.credentials.is_some()
    }

    /// Get the people API.
    pub fn people(&self) -> PeopleApi<'_> {
        PeopleApi::new(self)
    }

    /// Get the background checks API.
    pub fn background_checks(&self) -> BackgroundChecksApi<'_> {
        BackgroundChecksApi::new(self)
    }

    /// Fetch one page.
    pub async fn fetch(&self, path: &str, query: &Query) -> FlockResult<Document> {
        let query_string = query.build(today())?;
        let url = self.http.url_for(path, &query_string)?;
        self.http.get_document(url).await
    }

    /// Fetch up to `max_pages` pages, following whichever next-page
    /// mechanism the server offers, concatenating `data` and uniting
    /// `included` (deduplicated by type + id). `max_pages` is the only
    /// cancellation mechanism for an unattended walk; it is clamped to at
    /// least one page.
    pub async fn fetch_all(
        &self,
        path: &str,
        query: &Query,
        max_pages: u32,
    ) -> FlockResult<Document> {
        let max_pages = max_pages.max(1);
        let mut data: Vec<Resource> = Vec::new();
        let mut included: Vec<Resource> = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut next: Option<NextPage> = None;
        let mut pages = 0u32;

        loop {
            let document = match &next {
                None => self.fetch(path, query).await?,
                Some(NextPage::Url(link)) => {
                    let url = Url::parse(link)?;
                    self.http.get_document(url).await?
                }
                Some(NextPage::Offset(offset)) => {
                    let mut paged = query.clone();
                    paged.page = paged.page.with_offset(*offset);
                    self.fetch(path, &paged).await?
                }
            };
            pages += 1;

            let next_token = document.next_page();
            let Document {
                data: page_data,
                included: page_included,
                ..
            } = document;

            match page_data {
                Some(PrimaryData::Many(mut batch)) => data.append(&mut batch),
                Some(PrimaryData::One(resource)) => data.push(*resource),
                None => {}
            }
            for resource in page_included {
                if seen.insert(resource.key()) {
                    included.push(resource);
                }
            }

            match next_token {
                Some(token) if pages < max_pages => next = Some(token),
                _ => break,
            }
        }

        Ok(Document {
            data: Some(PrimaryData::Many(data)),
            included,
            ..Document::default()
        })
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Builder for creating a [`FlockClient`].
pub struct FlockClientBuilder {
    base_url: Option<String>,
    credentials: Option<Credentials>,
    timeout: Duration,
    retry: RetryConfig,
    rate_limit: RateLimitConfig,
    limiter: Option<Arc<RateLimiter>>,
}

impl FlockClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
            limiter: None,
        }
    }

    /// Set the base URL of the people API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Authenticate with an HTTP Basic application id + secret.
    pub fn basic_auth(mut self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic {
            client_id: client_id.into(),
            secret: secret.into(),
        });
        self
    }

    /// Authenticate with an OAuth bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Bearer(token.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the local rate-limit configuration.
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Share an externally owned limiter instead of constructing one.
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Build the client.
    pub fn build(self) -> FlockResult<FlockClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // A trailing slash keeps Url::join appending path segments rather
        // than replacing the last one.
        let mut base_url = Url::parse(&base_url_str)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let config = ClientConfig {
            base_url,
            credentials: self.credentials,
            timeout: self.timeout,
            retry: self.retry,
            rate_limit: self.rate_limit,
        };

        FlockClient::from_config(config, self.limiter)
    }
}

impl Default for FlockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
