//! Last-resort metadata derived from the URL itself

use super::metadata::MetadataSource;
use super::stage::{MetadataStage, ScrapeTarget, ScrapedFields};
use crate::url::LinkType;
use async_trait::async_trait;
use url::Url;

/// Builds a readable title from the last path segment, or the host
///
/// `https://example.com/blog/my_first-post.html` becomes "My First Post".
pub fn title_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .or_else(|| url.host_str())
        .unwrap_or_default();

    let stem = match segment.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < segment.len() => &segment[..pos],
        _ => segment,
    };

    let spaced = stem.replace(['-', '_'], " ");
    let title = capitalize_words(spaced.trim());
    if title.is_empty() {
        url.to_string()
    } else {
        title
    }
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_boundary = true;
    for c in text.chars() {
        if at_boundary && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_boundary = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// `owner/repo` (or just `owner`) for github.com URLs
pub fn github_author(url: &Url) -> Option<String> {
    if url.host_str()? != "github.com" {
        return None;
    }

    let parts: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match parts.as_slice() {
        [] => None,
        [owner] => Some(owner.to_string()),
        [owner, repo, ..] => Some(format!("{}/{}", owner, repo)),
    }
}

/// Stage that always succeeds with a URL-derived title
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicStage;

#[async_trait]
impl MetadataStage for HeuristicStage {
    fn source(&self) -> MetadataSource {
        MetadataSource::Fallback
    }

    fn applies_to(&self, _link_type: LinkType) -> bool {
        true
    }

    async fn scrape(&self, target: &ScrapeTarget) -> Option<ScrapedFields> {
        Some(ScrapedFields {
            title: Some(title_from_url(&target.url)),
            author: github_author(&target.url),
            ..ScrapedFields::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_url(&url("https://example.com/blog/my_first-post.html")),
            "My First Post"
        );
        assert_eq!(
            title_from_url(&url("https://example.com/docs/getting-started/")),
            "Getting Started"
        );
    }

    #[test]
    fn test_title_from_host() {
        assert_eq!(title_from_url(&url("https://example.com")), "Example");
        assert_eq!(title_from_url(&url("https://react.dev/")), "React");
    }

    #[test]
    fn test_github_author() {
        assert_eq!(
            github_author(&url("https://github.com/rust-lang/rust/issues")),
            Some("rust-lang/rust".to_string())
        );
        assert_eq!(
            github_author(&url("https://github.com/rust-lang")),
            Some("rust-lang".to_string())
        );
        assert_eq!(github_author(&url("https://github.com/")), None);
        assert_eq!(github_author(&url("https://gitlab.com/a/b")), None);
    }

    #[tokio::test]
    async fn test_stage_always_succeeds() {
        let target = ScrapeTarget::new(
            url("https://github.com/tokio-rs/tokio"),
            LinkType::Generic,
            "github.com".to_string(),
        );
        let fields = HeuristicStage.scrape(&target).await.unwrap();
        assert_eq!(fields.title.as_deref(), Some("Tokio"));
        assert_eq!(fields.author.as_deref(), Some("tokio-rs/tokio"));
    }
}
