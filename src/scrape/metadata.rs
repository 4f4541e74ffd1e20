use crate::extract::StructuredData;
use crate::url::LinkType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Which pipeline stage produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    PrimaryScrape,
    Oembed,
    Opengraph,
    Fallback,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryScrape => "primary_scrape",
            Self::Oembed => "oembed",
            Self::Opengraph => "opengraph",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata returned for one scraped URL
///
/// `display_title` is always present. `original_title` keeps whatever the
/// winning stage reported before the generic-title policy ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMetadata {
    pub url: String,
    pub title: Option<String>,
    pub display_title: String,
    pub original_title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    pub author: Option<String>,
    pub link_type: LinkType,
    pub domain: String,
    pub source: MetadataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<StructuredData>,
}

/// Health snapshot of the primary scrape service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperStatus {
    pub enabled: bool,
    pub circuit_breaker_open: bool,
    pub failure_count: u32,
    pub base_url: String,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&MetadataSource::PrimaryScrape).unwrap(),
            "\"primary_scrape\""
        );
        assert_eq!(MetadataSource::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = UrlMetadata {
            url: "https://example.com/".to_string(),
            title: Some("Example".to_string()),
            display_title: "Example".to_string(),
            original_title: Some("Example".to_string()),
            description: None,
            image_url: Some("https://example.com/a.png".to_string()),
            site_name: None,
            author: None,
            link_type: LinkType::Generic,
            domain: "example.com".to_string(),
            source: MetadataSource::Opengraph,
            structured_data: None,
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["displayTitle"], "Example");
        assert_eq!(json["imageUrl"], "https://example.com/a.png");
        assert_eq!(json["linkType"], "generic");
        assert_eq!(json["source"], "opengraph");
        assert!(json.get("structuredData").is_none());
    }
}
