use url::{ParseError, Url};

/// Normalizes user input into something the validator can judge
///
/// Input is trimmed, and input without a scheme (e.g. "example.com/page")
/// gets `https://` prepended. A bare `host:port` (e.g. "example.com:8080/docs"
/// or "localhost:3000") counts as schemeless even though it parses as an
/// opaque URL. Anything else is returned trimmed but otherwise untouched;
/// rejecting bad schemes is the validator's job.
///
/// # Examples
///
/// ```
/// use link_scout::url::normalize_protocol;
///
/// assert_eq!(normalize_protocol("  example.com/page "), "https://example.com/page");
/// assert_eq!(normalize_protocol("react.dev:443"), "https://react.dev:443");
/// assert_eq!(normalize_protocol("http://example.com"), "http://example.com");
/// assert_eq!(normalize_protocol("ftp://example.com"), "ftp://example.com");
/// ```
pub fn normalize_protocol(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match Url::parse(trimmed) {
        Err(ParseError::RelativeUrlWithoutBase) => format!("https://{}", trimmed),
        Ok(url) if is_host_with_port(trimmed, url.scheme()) => format!("https://{}", trimmed),
        _ => trimmed.to_string(),
    }
}

/// True when what parsed as `scheme:rest` is really `host:port[/path]`
fn is_host_with_port(trimmed: &str, scheme: &str) -> bool {
    if scheme.contains('.') {
        return true;
    }

    let Some((_, rest)) = trimmed.split_once(':') else {
        return false;
    };
    let port_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    port_len > 0
        && rest[port_len..]
            .chars()
            .next()
            .map_or(true, |c| matches!(c, '/' | '?' | '#'))
}
