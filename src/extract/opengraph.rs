use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// OpenGraph, Twitter card and basic HTML metadata from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraphData {
    pub og_title: Option<String>,
    pub og_site_name: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Vec<String>,
    pub og_type: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub twitter_creator: Option<String>,
    /// `<title>` text
    pub html_title: Option<String>,
    /// `<meta name="description">`
    pub meta_description: Option<String>,
    /// `<meta name="author">` or `article:author`
    pub author: Option<String>,
}

impl OpenGraphData {
    pub fn title(&self) -> Option<&str> {
        self.og_title
            .as_deref()
            .or(self.twitter_title.as_deref())
            .or(self.html_title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.og_description
            .as_deref()
            .or(self.twitter_description.as_deref())
            .or(self.meta_description.as_deref())
    }

    pub fn image(&self) -> Option<&str> {
        self.og_image
            .first()
            .map(String::as_str)
            .or(self.twitter_image.as_deref())
    }

    /// True when nothing useful was found
    pub fn is_empty(&self) -> bool {
        self.title().is_none() && self.description().is_none() && self.image().is_none()
    }
}

/// Parses OpenGraph and related metadata from an HTML document
///
/// Relative image URLs are resolved against `base_url`. The first value of
/// each single-valued property wins; every `og:image` is kept in order.
pub fn parse_opengraph(html: &str, base_url: &Url) -> OpenGraphData {
    let document = Html::parse_document(html);
    let mut data = OpenGraphData::default();

    if let Ok(meta) = Selector::parse("meta[content]") {
        for element in document.select(&meta) {
            let attrs = element.value();
            let Some(key) = attrs.attr("property").or_else(|| attrs.attr("name")) else {
                continue;
            };
            let Some(content) = attrs
                .attr("content")
                .map(str::trim)
                .filter(|c| !c.is_empty())
            else {
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "og:title" => set_once(&mut data.og_title, content),
                "og:site_name" => set_once(&mut data.og_site_name, content),
                "og:description" => set_once(&mut data.og_description, content),
                "og:type" => set_once(&mut data.og_type, content),
                "og:image" | "og:image:url" | "og:image:secure_url" => {
                    let resolved = resolve(base_url, content);
                    if !data.og_image.contains(&resolved) {
                        data.og_image.push(resolved);
                    }
                }
                "twitter:title" => set_once(&mut data.twitter_title, content),
                "twitter:description" => set_once(&mut data.twitter_description, content),
                "twitter:image" | "twitter:image:src" => {
                    if data.twitter_image.is_none() {
                        data.twitter_image = Some(resolve(base_url, content));
                    }
                }
                "twitter:creator" => set_once(&mut data.twitter_creator, content),
                "description" => set_once(&mut data.meta_description, content),
                "author" | "article:author" => set_once(&mut data.author, content),
                _ => {}
            }
        }
    }

    if let Ok(title) = Selector::parse("title") {
        data.html_title = document
            .select(&title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
    }

    data
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn resolve(base: &Url, value: &str) -> String {
    base.join(value)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.arelion.com/about/").unwrap()
    }

    #[test]
    fn test_parses_opengraph_tags() {
        let html = r#"<html><head>
            <title>Home</title>
            <meta property="og:title" content="Home">
            <meta property="og:site_name" content="Arelion">
            <meta property="og:description" content="Global internet backbone">
            <meta property="og:image" content="/img/og.png">
            <meta property="og:image" content="https://cdn.arelion.com/b.png">
            <meta name="author" content="Arelion Press">
        </head></html>"#;

        let data = parse_opengraph(html, &base());
        assert_eq!(data.title(), Some("Home"));
        assert_eq!(data.og_site_name.as_deref(), Some("Arelion"));
        assert_eq!(data.description(), Some("Global internet backbone"));
        assert_eq!(data.og_image.len(), 2);
        assert_eq!(data.image(), Some("https://www.arelion.com/img/og.png"));
        assert_eq!(data.author.as_deref(), Some("Arelion Press"));
    }

    #[test]
    fn test_twitter_and_html_fallbacks() {
        let html = r#"<html><head>
            <title>  Plain title </title>
            <meta name="twitter:description" content="From twitter">
            <meta name="twitter:image" content="pic.jpg">
            <meta name="twitter:creator" content="@rustlang">
        </head></html>"#;

        let data = parse_opengraph(html, &base());
        assert_eq!(data.title(), Some("Plain title"));
        assert_eq!(data.description(), Some("From twitter"));
        assert_eq!(data.image(), Some("https://www.arelion.com/about/pic.jpg"));
        assert_eq!(data.twitter_creator.as_deref(), Some("@rustlang"));
    }

    #[test]
    fn test_first_value_wins_and_blanks_ignored() {
        let html = r#"
            <meta property="og:title" content="  ">
            <meta property="og:title" content="First">
            <meta property="og:title" content="Second">"#;
        let data = parse_opengraph(html, &base());
        assert_eq!(data.og_title.as_deref(), Some("First"));
    }

    #[test]
    fn test_empty_page() {
        let data = parse_opengraph("<html><body>hi</body></html>", &base());
        assert!(data.is_empty());
    }
}
