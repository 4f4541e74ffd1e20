//! The scrape pipeline
//!
//! A URL is admitted (normalized, SSRF-checked, rate limited), then handed
//! to an ordered chain of [`MetadataStage`]s:
//!
//! 1. `PrimaryStage`: external scrape service behind breaker, robots.txt,
//!    pacing and retry (skipped for video links)
//! 2. `OembedStage`: provider oEmbed endpoint (video links only)
//! 3. `OpenGraphStage`: direct page fetch and OpenGraph parsing
//! 4. `HeuristicStage`: title derived from the URL, never fails
//!
//! The first stage to return fields wins; the title policy then picks the
//! display title.

mod fetcher;
mod heuristic;
mod metadata;
mod oembed;
mod opengraph;
mod orchestrator;
mod primary;
mod stage;
mod stats;
mod title;

pub use fetcher::{build_http_client, fetch_html, read_body_capped, FetchError, MAX_PAGE_BYTES};
pub use heuristic::{github_author, title_from_url, HeuristicStage};
pub use metadata::{MetadataSource, ScraperStatus, UrlMetadata};
pub use oembed::{default_providers, OembedProvider, OembedResponse, OembedStage};
pub use opengraph::{fields_from_opengraph, OpenGraphStage};
pub use orchestrator::{default_stages, is_valid_url, Scraper};
pub use primary::{fields_from_response, PageMetadata, PrimaryScrapeClient, PrimaryStage, ScrapeData};
pub use stage::{MetadataStage, ScrapeTarget, ScrapedFields};
pub use stats::{print_statistics, ScrapeStats, StatsSnapshot};
pub use title::{is_generic_title, resolve_title, ResolvedTitle, GENERIC_TITLES};
