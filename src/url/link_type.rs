use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Platforms whose pages are treated as video links
pub const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "twitch.tv",
];

/// Platforms whose pages are treated as social posts
pub const SOCIAL_HOSTS: &[&str] = &[
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "reddit.com",
];

/// Publishing platforms whose pages are treated as articles
pub const ARTICLE_HOSTS: &[&str] = &["medium.com", "substack.com"];

/// Path fragments that mark an article on any host
const ARTICLE_PATH_MARKERS: &[&str] = &["/article/", "/post/"];

/// Coarse category of a link, derived from the URL alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Article,
    Video,
    Social,
    Generic,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Video => "video",
            Self::Social => "social",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a URL into a link type
///
/// Checks run in a fixed order: video hosts, social hosts, article
/// platforms and paths, then generic. Host checks match the registered
/// domain or any subdomain of it (`m.youtube.com` is a video host,
/// `netflix.com` is not a match for `x.com`).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_scout::url::{classify_link, LinkType};
///
/// let url = Url::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(classify_link(&url), LinkType::Video);
///
/// let url = Url::parse("https://blog.rust-lang.org/2024/01/01/release.html").unwrap();
/// assert_eq!(classify_link(&url), LinkType::Article);
/// ```
pub fn classify_link(url: &Url) -> LinkType {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = url.path().to_ascii_lowercase();

    if host_in(&host, VIDEO_HOSTS) {
        return LinkType::Video;
    }

    if host_in(&host, SOCIAL_HOSTS) {
        return LinkType::Social;
    }

    if host_in(&host, ARTICLE_HOSTS)
        || host.starts_with("blog.")
        || host.contains(".blog.")
        || ARTICLE_PATH_MARKERS.iter().any(|m| path.contains(m))
    {
        return LinkType::Article;
    }

    LinkType::Generic
}

/// Returns true if the URL points at a known video platform
pub fn is_video_url(url: &Url) -> bool {
    classify_link(url) == LinkType::Video
}

fn host_in(host: &str, list: &[&str]) -> bool {
    list.iter().any(|candidate| {
        host == *candidate
            || host
                .strip_suffix(*candidate)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> LinkType {
        classify_link(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_video_hosts() {
        assert_eq!(classify("https://www.youtube.com/watch?v=abc"), LinkType::Video);
        assert_eq!(classify("https://youtu.be/abc"), LinkType::Video);
        assert_eq!(classify("https://vimeo.com/12345"), LinkType::Video);
        assert_eq!(classify("https://www.dailymotion.com/video/x1"), LinkType::Video);
        assert_eq!(classify("https://www.twitch.tv/someone"), LinkType::Video);
    }

    #[test]
    fn test_social_hosts() {
        assert_eq!(classify("https://twitter.com/rustlang"), LinkType::Social);
        assert_eq!(classify("https://x.com/rustlang/status/1"), LinkType::Social);
        assert_eq!(classify("https://www.reddit.com/r/rust"), LinkType::Social);
        assert_eq!(classify("https://www.linkedin.com/in/someone"), LinkType::Social);
    }

    #[test]
    fn test_article_patterns() {
        assert_eq!(classify("https://medium.com/@someone/a-story"), LinkType::Article);
        assert_eq!(classify("https://someone.substack.com/p/issue"), LinkType::Article);
        assert_eq!(classify("https://blog.rust-lang.org/"), LinkType::Article);
        assert_eq!(classify("https://example.com/article/42"), LinkType::Article);
        assert_eq!(classify("https://example.com/post/hello"), LinkType::Article);
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(classify("https://react.dev"), LinkType::Generic);
        assert_eq!(classify("https://github.com/rust-lang/rust"), LinkType::Generic);
    }

    #[test]
    fn test_host_match_needs_label_boundary() {
        assert_eq!(classify("https://netflix.com/title/1"), LinkType::Generic);
        assert_eq!(classify("https://notyoutube.com/watch"), LinkType::Generic);
    }

    #[test]
    fn test_video_checked_before_article() {
        assert_eq!(classify("https://youtube.com/post/123"), LinkType::Video);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&LinkType::Video).unwrap(), "\"video\"");
        assert_eq!(LinkType::Article.to_string(), "article");
    }
}
