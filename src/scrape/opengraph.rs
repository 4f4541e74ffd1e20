use super::fetcher::fetch_html;
use super::heuristic::github_author;
use super::metadata::MetadataSource;
use super::stage::{non_empty, MetadataStage, ScrapeTarget, ScrapedFields};
use crate::antibot::BrowserProfile;
use crate::extract::{parse_opengraph, OpenGraphData};
use crate::url::LinkType;
use async_trait::async_trait;
use reqwest::Client;

/// Fetches the page directly and reads its OpenGraph / Twitter card tags
#[derive(Debug, Clone)]
pub struct OpenGraphStage {
    client: Client,
}

impl OpenGraphStage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Maps parsed tags onto scraped fields
///
/// The author falls back to the Twitter creator, then to the GitHub
/// `owner/repo` for github.com pages.
pub fn fields_from_opengraph(data: OpenGraphData, target: &ScrapeTarget) -> ScrapedFields {
    let author = non_empty(data.author.clone())
        .or_else(|| non_empty(data.twitter_creator.clone()))
        .or_else(|| github_author(&target.url));

    ScrapedFields {
        title: non_empty(data.title().map(str::to_string)),
        description: non_empty(data.description().map(str::to_string)),
        image_url: data.image().map(str::to_string),
        site_name: non_empty(data.og_site_name),
        author,
        structured_data: None,
    }
}

#[async_trait]
impl MetadataStage for OpenGraphStage {
    fn source(&self) -> MetadataSource {
        MetadataSource::Opengraph
    }

    fn applies_to(&self, _link_type: LinkType) -> bool {
        true
    }

    async fn scrape(&self, target: &ScrapeTarget) -> Option<ScrapedFields> {
        let headers = BrowserProfile::random().to_header_map();
        let html = match fetch_html(&self.client, &target.url, headers).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("OpenGraph fetch of {} failed: {}", target.url, e);
                return None;
            }
        };

        let data = parse_opengraph(&html, &target.url);
        if data.is_empty() {
            tracing::debug!("No OpenGraph metadata on {}", target.url);
            return None;
        }

        Some(fields_from_opengraph(data, target))
    }
}
