use super::metadata::MetadataSource;
use crate::extract::StructuredData;
use crate::url::LinkType;
use async_trait::async_trait;
use url::Url;

/// A validated URL on its way through the stage chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    pub url: Url,
    pub link_type: LinkType,
    pub domain: String,
}

impl ScrapeTarget {
    pub fn new(url: Url, link_type: LinkType, domain: String) -> Self {
        Self {
            url,
            link_type,
            domain,
        }
    }
}

/// What a stage found, before the title policy runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    pub author: Option<String>,
    pub structured_data: Option<StructuredData>,
}

/// One source in the fallback chain
///
/// Stages never return errors. A failure is logged inside the stage and
/// reported as `None`, which hands the URL to the next stage.
#[async_trait]
pub trait MetadataStage: Send + Sync {
    /// The source recorded on results from this stage
    fn source(&self) -> MetadataSource;

    /// Whether the stage runs at all for this kind of link
    fn applies_to(&self, link_type: LinkType) -> bool;

    async fn scrape(&self, target: &ScrapeTarget) -> Option<ScrapedFields>;
}

/// Trims and drops empty strings
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  a ".into())), Some("a".to_string()));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
