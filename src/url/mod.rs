//! URL handling module for Link-Scout
//!
//! This module provides protocol normalization, SSRF validation, hostname
//! extraction, blocklist matching and link-type classification.

mod domain;
mod link_type;
mod matcher;
mod normalize;
mod validate;

// Re-export main functions
pub use domain::{domain_of, extract_domain};
pub use link_type::{
    classify_link, is_video_url, LinkType, ARTICLE_HOSTS, SOCIAL_HOSTS, VIDEO_HOSTS,
};
pub use matcher::{matches_any, matches_wildcard};
pub use normalize::normalize_protocol;
pub use validate::{
    is_private_ipv4, is_private_ipv6, validate_all, validate_url, validate_url_with_blocklist,
    ValidationResult, MAX_URL_LENGTH,
};
