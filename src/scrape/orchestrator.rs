//! Scrape orchestration
//!
//! This module handles:
//! - Admitting URLs (normalization, SSRF validation, domain rate limiting)
//! - Running the stage chain until one stage produces metadata
//! - Applying the generic-title policy to the result
//! - Batch scraping with per-URL failure isolation

use super::fetcher::build_http_client;
use super::heuristic::{title_from_url, HeuristicStage};
use super::metadata::{MetadataSource, ScraperStatus, UrlMetadata};
use super::oembed::OembedStage;
use super::opengraph::OpenGraphStage;
use super::primary::PrimaryStage;
use super::stage::{MetadataStage, ScrapeTarget, ScrapedFields};
use super::stats::{ScrapeStats, StatsSnapshot};
use super::title::resolve_title;
use crate::config::{validate, Config};
use crate::retry::RetryConfig;
use crate::state::ScraperState;
use crate::url::{classify_link, extract_domain, normalize_protocol, validate_url, validate_url_with_blocklist};
use crate::{ScrapeError, UrlError};
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Builds the standard stage chain: primary, oEmbed, OpenGraph, heuristic
pub fn default_stages(
    config: &Config,
    http: Client,
    state: Arc<ScraperState>,
    stats: Arc<ScrapeStats>,
) -> Vec<Box<dyn MetadataStage>> {
    vec![
        Box::new(PrimaryStage::new(
            config.primary.clone(),
            RetryConfig::from(&config.retry),
            http.clone(),
            state,
            stats,
        )),
        Box::new(OembedStage::new(http.clone())),
        Box::new(OpenGraphStage::new(http)),
        Box::new(HeuristicStage),
    ]
}

/// URL metadata scraper
///
/// Owns its rate-limit, pacing and circuit-breaker state; two scrapers never
/// share any of it.
pub struct Scraper {
    config: Config,
    state: Arc<ScraperState>,
    stats: Arc<ScrapeStats>,
    stages: Vec<Box<dyn MetadataStage>>,
}

impl Scraper {
    /// Creates a scraper with the standard stage chain
    ///
    /// # Returns
    ///
    /// * `Ok(Scraper)` - Ready to scrape
    /// * `Err(ScrapeError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> crate::Result<Self> {
        validate(&config)?;
        let http = build_http_client(&config.http)?;
        let state = Arc::new(ScraperState::new(&config));
        let stats = Arc::new(ScrapeStats::new());
        let stages = default_stages(&config, http, Arc::clone(&state), Arc::clone(&stats));
        Ok(Self::from_parts(config, state, stats, stages))
    }

    /// Assembles a scraper from an explicit stage chain
    ///
    /// Stages that need the shared state or counters should be built from
    /// the same `state` and `stats` passed here.
    pub fn from_parts(
        config: Config,
        state: Arc<ScraperState>,
        stats: Arc<ScrapeStats>,
        stages: Vec<Box<dyn MetadataStage>>,
    ) -> Self {
        Self {
            config,
            state,
            stats,
            stages,
        }
    }

    /// Scrapes metadata for one URL
    ///
    /// # Returns
    ///
    /// * `Ok(UrlMetadata)` - Always, once the URL is admitted; stage failures
    ///   degrade to a URL-derived result
    /// * `Err(ScrapeError)` - The URL failed validation or hit the rate limit
    pub async fn scrape_url(&self, raw: &str) -> crate::Result<UrlMetadata> {
        let target = self.validate_and_rate_limit(raw)?;

        let mut found: Option<(MetadataSource, ScrapedFields)> = None;
        for stage in &self.stages {
            if !stage.applies_to(target.link_type) {
                continue;
            }

            tracing::debug!("Trying {} for {}", stage.source(), target.url);
            if let Some(fields) = stage.scrape(&target).await {
                found = Some((stage.source(), fields));
                break;
            }
        }

        let (source, fields) = match found {
            Some(found) => found,
            None => (MetadataSource::Fallback, fallback_fields(&target).await),
        };

        Ok(self.finish(target, source, fields))
    }

    /// Scrapes several URLs concurrently
    ///
    /// URLs that are rejected are logged and left out of the result; the
    /// order of the remaining results follows the input.
    pub async fn scrape_urls<S: AsRef<str>>(&self, urls: &[S]) -> Vec<UrlMetadata> {
        let results = join_all(urls.iter().map(|url| self.scrape_url(url.as_ref()))).await;

        results
            .into_iter()
            .zip(urls)
            .filter_map(|(result, url)| match result {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url.as_ref(), e);
                    None
                }
            })
            .collect()
    }

    /// Checks a URL without scraping it or touching the rate limiter
    pub fn is_valid_url(&self, raw: &str) -> bool {
        validate_url_with_blocklist(
            &normalize_protocol(raw),
            &self.config.security.extra_blocked_hosts,
        )
        .is_valid
    }

    /// Runs the admission gate: normalization, SSRF validation, rate limit
    ///
    /// A URL that passes counts against its domain's rate limit.
    pub fn validate_and_rate_limit(&self, raw: &str) -> crate::Result<ScrapeTarget> {
        let normalized = normalize_protocol(raw);
        let verdict =
            validate_url_with_blocklist(&normalized, &self.config.security.extra_blocked_hosts);

        let sanitized = match (verdict.is_valid, verdict.sanitized_url) {
            (true, Some(sanitized)) => sanitized,
            _ => {
                let reason = verdict
                    .reason
                    .unwrap_or_else(|| "Invalid URL".to_string());
                tracing::warn!("Rejected {}: {}", normalized, reason);
                self.stats.record_rejected();
                return Err(ScrapeError::Rejected { reason });
            }
        };

        let url = Url::parse(&sanitized).map_err(|e| UrlError::Parse(e.to_string()))?;
        let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;

        let decision = self.state.rate_limiter.check_and_record(url.as_str());
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Rate limit exceeded".to_string());
            tracing::warn!("{}", reason);
            self.stats.record_rate_limited();
            return Err(ScrapeError::RateLimited { reason });
        }

        let link_type = classify_link(&url);
        Ok(ScrapeTarget::new(url, link_type, domain))
    }

    /// Health of the primary scrape service
    pub fn status(&self) -> ScraperStatus {
        let breaker = self.state.breaker.snapshot();
        ScraperStatus {
            enabled: self.config.primary.enabled,
            circuit_breaker_open: breaker.is_open,
            failure_count: breaker.failure_count,
            base_url: self.config.primary.base_url.clone(),
            checked_at: Utc::now(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn state(&self) -> &ScraperState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn finish(&self, target: ScrapeTarget, source: MetadataSource, fields: ScrapedFields) -> UrlMetadata {
        let fallback_title = title_from_url(&target.url);
        let schema = fields
            .structured_data
            .as_ref()
            .and_then(|data| data.best_schema());
        let resolved = resolve_title(
            fields.title.as_deref(),
            fields.site_name.as_deref(),
            schema,
            &fallback_title,
        );

        if resolved.was_generic {
            tracing::debug!(
                "Generic title {:?} on {} shown as {:?}",
                resolved.title,
                target.url,
                resolved.display_title
            );
            self.stats.record_generic_title();
        }
        self.stats.record_source(source);
        tracing::debug!("{} scraped via {}", target.url, source);

        UrlMetadata {
            url: target.url.to_string(),
            title: resolved.title.clone(),
            display_title: resolved.display_title,
            original_title: resolved.title,
            description: fields.description,
            image_url: fields.image_url,
            site_name: fields.site_name,
            author: fields.author,
            link_type: target.link_type,
            domain: target.domain,
            source,
            structured_data: fields.structured_data,
        }
    }
}

async fn fallback_fields(target: &ScrapeTarget) -> ScrapedFields {
    HeuristicStage
        .scrape(target)
        .await
        .unwrap_or_default()
}

/// Lightweight pre-check: normalization plus the built-in SSRF rules
pub fn is_valid_url(raw: &str) -> bool {
    validate_url(&normalize_protocol(raw)).is_valid
}
