//! SSRF validation for user-supplied URLs
//!
//! Every URL is checked here before any network call is made on its behalf.
//! The validator is pure: no DNS lookups, no I/O.

use super::matcher::matches_any;
use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Longest URL accepted, in characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Hosts that are never fetched regardless of configuration
const BLOCKED_HOSTS: &[&str] = &[
    "*.localhost",
    "metadata.google.internal",
    "169.254.169.254",
    "instance-data",
];

/// Outcome of validating a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: Option<String>,
    /// Canonical form of the URL; set only when `is_valid` is true
    pub sanitized_url: Option<String>,
}

impl ValidationResult {
    fn valid(url: &Url) -> Self {
        Self {
            is_valid: true,
            reason: None,
            sanitized_url: Some(url.to_string()),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
            sanitized_url: None,
        }
    }
}

/// Validates a URL against the built-in SSRF rules
///
/// # Returns
///
/// A `ValidationResult`. When valid, `sanitized_url` holds the re-serialized
/// URL (lowercased host, canonical IP literals, default path).
///
/// # Examples
///
/// ```
/// use link_scout::url::validate_url;
///
/// assert!(validate_url("https://react.dev").is_valid);
/// assert!(!validate_url("http://10.0.0.1/admin").is_valid);
/// assert!(!validate_url("file:///etc/passwd").is_valid);
/// ```
pub fn validate_url(raw: &str) -> ValidationResult {
    validate_url_with_blocklist::<&str>(raw, &[])
}

/// Validates a URL, additionally rejecting hosts matching `extra_blocked`
///
/// Extra patterns use the same syntax as the built-in blocklist
/// ("host" or "*.domain").
pub fn validate_url_with_blocklist<S: AsRef<str>>(
    raw: &str,
    extra_blocked: &[S],
) -> ValidationResult {
    let raw = raw.trim();
    if raw.is_empty() {
        return ValidationResult::invalid("URL must be a non-empty string");
    }

    if raw.chars().count() > MAX_URL_LENGTH {
        return ValidationResult::invalid(format!(
            "URL exceeds maximum length ({} characters)",
            MAX_URL_LENGTH
        ));
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return ValidationResult::invalid("Invalid URL format"),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return ValidationResult::invalid(format!(
            "Protocol '{}:' not allowed. Use http: or https:",
            url.scheme()
        ));
    }

    let host = match url.host() {
        Some(host) => host,
        None => return ValidationResult::invalid("Invalid URL format"),
    };

    let host_str = url.host_str().unwrap_or_default();
    if matches_any(BLOCKED_HOSTS, host_str) || matches_any(extra_blocked, host_str) {
        return ValidationResult::invalid(format!(
            "Hostname '{}' is blocked (localhost/metadata service)",
            host_str
        ));
    }

    match host {
        Host::Ipv4(ip) if is_private_ipv4(&ip) => {
            return ValidationResult::invalid(format!("Private IP address detected: {}", ip));
        }
        Host::Ipv6(ip) if is_private_ipv6(&ip) => {
            return ValidationResult::invalid(format!("Private IPv6 address detected: {}", ip));
        }
        _ => {}
    }

    if !url.username().is_empty() || url.password().is_some() {
        return ValidationResult::invalid("URLs with embedded credentials are not allowed");
    }

    ValidationResult::valid(&url)
}

/// Validates a batch of URLs, preserving input order
pub fn validate_all<S: AsRef<str>>(urls: &[S]) -> Vec<ValidationResult> {
    urls.iter().map(|u| validate_url(u.as_ref())).collect()
}

/// Returns true for loopback, private, link-local and "this network" IPv4 ranges
///
/// Covers 127/8, 10/8, 172.16/12, 192.168/16, 169.254/16 and 0/8.
pub fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.octets()[0] == 0
}

/// Returns true for loopback, unspecified, link-local and unique-local IPv6
///
/// IPv4-mapped (`::ffff:a.b.c.d`) and IPv4-compatible (`::a.b.c.d`)
/// addresses are judged by their IPv4 part.
pub fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(&v4);
    }

    // `to_ipv4` also maps `::` and `::1`; those are handled below
    if !ip.is_loopback() && !ip.is_unspecified() {
        if let Some(v4) = ip.to_ipv4() {
            return is_private_ipv4(&v4);
        }
    }

    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fe80::/10
        || (first & 0xffc0) == 0xfe80
        // fc00::/7, which includes fd00::/8
        || (first & 0xfe00) == 0xfc00
}
