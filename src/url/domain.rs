use url::Url;

/// Extracts the hostname from a URL
///
/// The host is lowercased and IPv6 literals keep their brackets, matching what
/// the rate limiter and pacer use as their per-host key.
///
/// # Arguments
///
/// * `url` - The URL to extract the hostname from
///
/// # Returns
///
/// * `Some(String)` - The lowercase hostname
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_scout::url::extract_domain;
///
/// let url = Url::parse("https://Blog.Example.COM/post").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Parses a raw string and extracts its hostname
///
/// Returns `None` for anything that does not parse as an absolute URL with a host.
pub fn domain_of(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().as_ref().and_then(extract_domain)
}
