use crate::extract::Schema;

/// Placeholder titles that say nothing about the page
pub const GENERIC_TITLES: &[&str] = &[
    "home",
    "welcome",
    "index",
    "homepage",
    "main page",
    "untitled",
    "landing",
];

/// Returns true for titles such as "Home" or "Welcome to our site"
///
/// Matching is case-insensitive. A prefix only counts when it ends on a word
/// boundary, so "Home | Arelion" is generic but "Homebrew" is not.
pub fn is_generic_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return false;
    }

    GENERIC_TITLES.iter().any(|generic| match title.strip_prefix(generic) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    })
}

/// Outcome of the title policy for one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    /// Title stored for search and archival
    pub title: Option<String>,
    /// Title shown to users; never empty
    pub display_title: String,
    /// Whether the scraped title was a placeholder
    pub was_generic: bool,
}

/// Picks the title and display title for a scraped page
///
/// A generic title is kept as `title` but replaced for display by the site
/// name, or failing that the best schema's `headline`/`name`. A missing title
/// is taken from the schema, then from the URL-derived `fallback`.
pub fn resolve_title(
    title: Option<&str>,
    site_name: Option<&str>,
    schema: Option<&Schema>,
    fallback: &str,
) -> ResolvedTitle {
    let schema_title = || schema.and_then(schema_headline);

    match title {
        Some(title) if is_generic_title(title) => {
            let display_title = site_name
                .map(str::to_string)
                .or_else(schema_title)
                .unwrap_or_else(|| title.to_string());
            ResolvedTitle {
                title: Some(title.to_string()),
                display_title,
                was_generic: true,
            }
        }
        Some(title) => ResolvedTitle {
            title: Some(title.to_string()),
            display_title: title.to_string(),
            was_generic: false,
        },
        None => {
            let title = schema_title();
            let display_title = title.clone().unwrap_or_else(|| fallback.to_string());
            ResolvedTitle {
                title,
                display_title,
                was_generic: false,
            }
        }
    }
}

/// `headline` for articles, `name` for everything else
pub(crate) fn schema_headline(schema: &Schema) -> Option<String> {
    schema
        .text_property("headline")
        .or_else(|| schema.text_property("name"))
}
