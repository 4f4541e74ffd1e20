//! Primary scrape stage: an external rendering/scrape service
//!
//! The service call is wrapped, from the outside in, by the circuit breaker,
//! the robots.txt check, domain pacing and the retry engine. The breaker
//! decides whether to call at all; the retry engine decides how hard to try
//! once a call is allowed.

use super::fetcher::{read_body_capped, FetchError, MAX_PAGE_BYTES};
use super::metadata::MetadataSource;
use super::stage::{non_empty, MetadataStage, ScrapeTarget, ScrapedFields};
use super::stats::ScrapeStats;
use super::title::schema_headline;
use crate::antibot::{BrowserProfile, Viewport};
use crate::config::PrimaryConfig;
use crate::extract::extract_structured_data;
use crate::retry::{retry_with_timeout, RetryConfig};
use crate::robots::{check_robots, RobotsVerdict};
use crate::state::ScraperState;
use crate::url::LinkType;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Output formats requested from the service
const FORMATS: &[&str] = &["markdown", "metadata", "html"];

/// Range for the service-side render wait (milliseconds)
const WAIT_FOR_MS: (u64, u64) = (1000, 3000);

/// User agent token used for robots.txt group matching
const ROBOTS_USER_AGENT: &str = "*";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [&'a str],
    only_main_content: bool,
    wait_for: u64,
    user_agent: &'a str,
    viewport: Viewport,
    headers: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

/// Payload of a successful scrape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeData {
    #[serde(default)]
    pub metadata: PageMetadata,
    pub html: Option<String>,
    pub markdown: Option<String>,
}

/// Page metadata reported by the service
///
/// Values the service sends as arrays are reduced to their first string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMetadata {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_image: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub og_site_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(rename = "sourceURL", deserialize_with = "lenient_string")]
    pub source_url: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        }),
        _ => None,
    })
}

/// HTTP client for `{base-url}/v1/scrape`
#[derive(Debug, Clone)]
pub struct PrimaryScrapeClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl PrimaryScrapeClient {
    pub fn new(client: Client, config: &PrimaryConfig) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/v1/scrape",
            config.base_url.trim_end_matches('/')
        ))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one scrape request
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeData)` - The service reported success
    /// * `Err(FetchError)` - Transport error, non-2xx status, unreadable
    ///   envelope, or `success: false`
    pub async fn scrape(&self, url: &Url, profile: &BrowserProfile) -> Result<ScrapeData, FetchError> {
        let wait_for = rand::thread_rng().gen_range(WAIT_FOR_MS.0..=WAIT_FOR_MS.1);
        let body = ScrapeRequest {
            url: url.as_str(),
            formats: FORMATS,
            only_main_content: true,
            wait_for,
            user_agent: &profile.user_agent,
            viewport: profile.viewport,
            headers: &profile.headers,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        // The envelope carries both the HTML and the markdown of a page
        let body = read_body_capped(response, 2 * MAX_PAGE_BYTES).await?;
        let envelope: ScrapeResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::InvalidBody(e.to_string()))?;

        match envelope {
            ScrapeResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            ScrapeResponse { error, .. } => Err(FetchError::ServiceRejected(
                error.unwrap_or_else(|| "no data returned".to_string()),
            )),
        }
    }
}

/// Maps a service response onto scraped fields, enriched from page markup
///
/// OpenGraph values win over plain ones. Title, description and author
/// missing from the service metadata are taken from the best schema.org
/// entity in the returned HTML.
pub fn fields_from_response(data: ScrapeData) -> ScrapedFields {
    let metadata = data.metadata;
    let structured_data = data.html.as_deref().map(extract_structured_data);
    let schema = structured_data.as_ref().and_then(|s| s.best_schema());

    let mut title = non_empty(metadata.og_title).or(non_empty(metadata.title));
    let mut description = non_empty(metadata.og_description).or(non_empty(metadata.description));
    let mut author = non_empty(metadata.author);

    if let Some(schema) = schema {
        if title.is_none() {
            title = schema_headline(schema);
        }
        if description.is_none() {
            description = schema.text_property("description");
        }
        if author.is_none() {
            author = schema.text_property("author");
        }
    }

    ScrapedFields {
        title,
        description,
        image_url: non_empty(metadata.og_image),
        site_name: non_empty(metadata.og_site_name),
        author,
        structured_data,
    }
}

/// Stage wrapping [`PrimaryScrapeClient`] with breaker, robots, pacing and retry
///
/// The client itself is built on first use so a disabled service costs
/// nothing.
pub struct PrimaryStage {
    config: PrimaryConfig,
    retry: RetryConfig,
    http: Client,
    state: Arc<ScraperState>,
    stats: Arc<ScrapeStats>,
    client: OnceCell<Option<PrimaryScrapeClient>>,
}

impl PrimaryStage {
    pub fn new(
        config: PrimaryConfig,
        retry: RetryConfig,
        http: Client,
        state: Arc<ScraperState>,
        stats: Arc<ScrapeStats>,
    ) -> Self {
        Self {
            config,
            retry,
            http,
            state,
            stats,
            client: OnceCell::new(),
        }
    }

    fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn client(&self) -> Option<&PrimaryScrapeClient> {
        self.client
            .get_or_init(|| async {
                match PrimaryScrapeClient::new(self.http.clone(), &self.config) {
                    Ok(client) => {
                        tracing::debug!("Primary scrape client ready at {}", client.endpoint());
                        Some(client)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Primary scrape base URL {} is unusable: {}",
                            self.config.base_url,
                            e
                        );
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

#[async_trait]
impl MetadataStage for PrimaryStage {
    fn source(&self) -> MetadataSource {
        MetadataSource::PrimaryScrape
    }

    fn applies_to(&self, link_type: LinkType) -> bool {
        self.config.enabled && link_type != LinkType::Video
    }

    async fn scrape(&self, target: &ScrapeTarget) -> Option<ScrapedFields> {
        if !self.state.breaker.allow_request() {
            tracing::debug!("Circuit breaker open, skipping primary scrape of {}", target.url);
            return None;
        }

        if self.config.respect_robots_txt {
            let verdict = check_robots(&self.http, target.url.as_str(), ROBOTS_USER_AGENT).await;
            self.stats.record_robots(verdict);
            if verdict == RobotsVerdict::Disallowed {
                tracing::debug!("robots.txt disallows {}", target.url);
                return None;
            }
        }

        self.state.pacer.wait_turn(&target.domain).await;

        let client = self.client().await?;
        let profile = BrowserProfile::random();
        let url = &target.url;
        let profile_ref = &profile;

        let outcome = retry_with_timeout(
            move || client.scrape(url, profile_ref),
            &self.retry,
            self.attempt_timeout(),
        )
        .await;
        self.stats.record_attempts(outcome.attempts);

        match outcome.result {
            Ok(data) => {
                self.state.breaker.record_success();
                Some(fields_from_response(data))
            }
            Err(e) => {
                tracing::warn!(
                    "Primary scrape of {} failed after {} attempts: {}",
                    target.url,
                    outcome.attempts,
                    e
                );
                if self.state.breaker.record_failure() {
                    self.stats.record_breaker_opened();
                }
                None
            }
        }
    }
}
