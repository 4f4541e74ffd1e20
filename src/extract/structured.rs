//! Schema.org structured data extraction
//!
//! Three sources, in order of authority: JSON-LD scripts, Microdata
//! attributes, and a handful of CSS heuristics for pages with neither.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One schema.org entity found on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// schema.org type name, e.g. "Article" or "Product"
    #[serde(rename = "type")]
    pub schema_type: String,
    /// The entity's properties (the raw object for JSON-LD)
    pub properties: Value,
}

impl Schema {
    /// Reads a property as plain text
    ///
    /// Strings are returned as is; objects yield their `name`; arrays yield
    /// their first readable element. Blank values count as missing.
    pub fn text_property(&self, key: &str) -> Option<String> {
        value_as_text(self.properties.get(key)?)
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) => map.get("name").and_then(value_as_text),
        Value::Array(items) => items.iter().find_map(value_as_text),
        _ => None,
    }
}

/// Everything extracted from one HTML document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    pub json_ld: Vec<Schema>,
    pub microdata: Vec<Schema>,
    /// Heuristic values keyed by field (title, author, publishDate, ...);
    /// only filled when the page has no schema markup
    pub patterns: BTreeMap<String, String>,
}

impl StructuredData {
    /// JSON-LD first, then Microdata
    pub fn best_schema(&self) -> Option<&Schema> {
        self.json_ld.first().or_else(|| self.microdata.first())
    }

    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty() && self.microdata.is_empty() && self.patterns.is_empty()
    }
}

/// Extracts JSON-LD, Microdata and (when both are empty) heuristic patterns
pub fn extract_structured_data(html: &str) -> StructuredData {
    let document = Html::parse_document(html);

    let json_ld = extract_json_ld_from(&document);
    let microdata = extract_microdata_from(&document);
    let patterns = if json_ld.is_empty() && microdata.is_empty() {
        extract_patterns_from(&document)
    } else {
        BTreeMap::new()
    };

    StructuredData {
        json_ld,
        microdata,
        patterns,
    }
}

/// Returns the most authoritative schema on the page, if any
///
/// # Examples
///
/// ```
/// use link_scout::extract::get_best_schema;
///
/// let html = r#"<script type="application/ld+json">{"@type": "Article", "headline": "Hi"}</script>"#;
/// assert_eq!(get_best_schema(html).unwrap().schema_type, "Article");
/// assert!(get_best_schema("<p>plain</p>").is_none());
/// ```
pub fn get_best_schema(html: &str) -> Option<Schema> {
    let document = Html::parse_document(html);
    extract_json_ld_from(&document)
        .into_iter()
        .next()
        .or_else(|| extract_microdata_from(&document).into_iter().next())
}

/// Parses every `application/ld+json` script
///
/// Scripts holding invalid JSON are logged and skipped. Entries without an
/// `@type` are dropped; `@graph` containers are flattened.
pub fn extract_json_ld(html: &str) -> Vec<Schema> {
    extract_json_ld_from(&Html::parse_document(html))
}

fn extract_json_ld_from(document: &Html) -> Vec<Schema> {
    let Some(selector) = selector(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut schemas = Vec::new();
    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if text.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => collect_json_ld(value, &mut schemas),
            Err(e) => tracing::warn!("Skipping malformed JSON-LD block: {}", e),
        }
    }
    schemas
}

fn collect_json_ld(value: Value, schemas: &mut Vec<Schema>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_json_ld(item, schemas);
            }
        }
        Value::Object(mut object) => {
            if let Some(schema_type) = object.get("@type").and_then(type_name) {
                schemas.push(Schema {
                    schema_type,
                    properties: Value::Object(object),
                });
            } else if let Some(graph) = object.remove("@graph") {
                collect_json_ld(graph, schemas);
            }
        }
        _ => {}
    }
}

fn type_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(type_name),
        _ => None,
    }
}

/// Reads every `itemscope` element that declares an `itemtype`
///
/// Property values prefer, in order: `content`, `datetime`, `href`, `src`,
/// then trimmed text. Items without properties are dropped.
pub fn extract_microdata(html: &str) -> Vec<Schema> {
    extract_microdata_from(&Html::parse_document(html))
}

fn extract_microdata_from(document: &Html) -> Vec<Schema> {
    let (Some(scope_selector), Some(prop_selector)) =
        (selector("[itemscope][itemtype]"), selector("[itemprop]"))
    else {
        return Vec::new();
    };

    let mut schemas = Vec::new();
    for item in document.select(&scope_selector) {
        let item_type = item.value().attr("itemtype").unwrap_or_default();
        let schema_type = item_type
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|t| !t.is_empty())
            .unwrap_or("Unknown")
            .to_string();

        let mut properties = Map::new();
        for prop in item.select(&prop_selector) {
            let Some(name) = prop.value().attr("itemprop").filter(|n| !n.is_empty()) else {
                continue;
            };
            properties.insert(name.to_string(), Value::String(microdata_value(&prop)));
        }

        if !properties.is_empty() {
            schemas.push(Schema {
                schema_type,
                properties: Value::Object(properties),
            });
        }
    }
    schemas
}

fn microdata_value(element: &ElementRef<'_>) -> String {
    let attrs = element.value();
    ["content", "datetime", "href", "src"]
        .iter()
        .find_map(|name| attrs.attr(name).filter(|v| !v.is_empty()))
        .map(|v| v.to_string())
        .unwrap_or_else(|| element_text(element))
}

/// CSS heuristics for pages without schema markup
const PATTERN_SELECTORS: &[(&str, &str)] = &[
    ("title", r#"article h1, .article-title, [class*="headline"]"#),
    ("author", r#"[rel="author"], .author-name, [class*="author"]"#),
    ("publishDate", r#"time[datetime], .publish-date, [class*="date"]"#),
    ("description", r#"meta[name="description"]"#),
];

const PRICE_SELECTOR: &str = r#"[class*="price"], .price, [itemprop="price"]"#;
const LOGO_SELECTOR: &str = r#"[class*="logo"] img, .site-logo img, [itemprop="logo"]"#;

/// Runs the heuristic selectors over a page
pub fn extract_patterns(html: &str) -> BTreeMap<String, String> {
    extract_patterns_from(&Html::parse_document(html))
}

fn extract_patterns_from(document: &Html) -> BTreeMap<String, String> {
    let mut patterns = BTreeMap::new();

    for (key, css) in PATTERN_SELECTORS {
        let Some(element) = first_match(document, css) else {
            continue;
        };
        let attrs = element.value();
        let value = attrs
            .attr("datetime")
            .or_else(|| attrs.attr("content"))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| element_text(&element));
        if !value.is_empty() {
            patterns.insert(key.to_string(), value);
        }
    }

    if let Some(price) = first_match(document, PRICE_SELECTOR).map(|e| element_text(&e)) {
        if !price.is_empty() {
            patterns.insert("price".to_string(), price);
        }
    }

    if let Some(logo) = first_match(document, LOGO_SELECTOR)
        .and_then(|e| e.value().attr("src").map(str::to_string))
    {
        patterns.insert("logo".to_string(), logo);
    }

    patterns
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    document.select(&selector).next()
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Collapses whitespace in an element's text
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
