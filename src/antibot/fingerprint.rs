use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use serde::Serialize;
use std::collections::BTreeMap;

/// Browser family a user agent belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

impl BrowserFamily {
    /// Chromium-based browsers send client hints (`Sec-Ch-Ua-*`)
    pub fn sends_client_hints(&self) -> bool {
        matches!(self, Self::Chrome | Self::Edge)
    }
}

/// A desktop browser identity in the rotation pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub user_agent: &'static str,
    pub family: BrowserFamily,
    /// Value of `Sec-Ch-Ua-Platform`, quoted as browsers send it
    pub platform: &'static str,
}

/// Rotation pool of current desktop browsers
pub const BROWSER_IDENTITIES: &[BrowserIdentity] = &[
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        family: BrowserFamily::Chrome,
        platform: "\"Windows\"",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        family: BrowserFamily::Chrome,
        platform: "\"macOS\"",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
        family: BrowserFamily::Firefox,
        platform: "\"Windows\"",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
        family: BrowserFamily::Safari,
        platform: "\"macOS\"",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
        family: BrowserFamily::Edge,
        platform: "\"Windows\"",
    },
];

/// Common desktop screen resolutions
pub const VIEWPORTS: &[Viewport] = &[
    Viewport { width: 1920, height: 1080 },
    Viewport { width: 1366, height: 768 },
    Viewport { width: 1536, height: 864 },
    Viewport { width: 1440, height: 900 },
    Viewport { width: 2560, height: 1440 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// User agent, viewport and headers for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub viewport: Viewport,
    pub headers: BTreeMap<String, String>,
}

impl BrowserProfile {
    /// Picks a random identity and viewport from the pools
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let identity = BROWSER_IDENTITIES
            .choose(&mut rng)
            .copied()
            .unwrap_or(BROWSER_IDENTITIES[0]);
        let viewport = VIEWPORTS.choose(&mut rng).copied().unwrap_or(VIEWPORTS[0]);
        Self::for_identity(&identity, viewport)
    }

    pub fn for_identity(identity: &BrowserIdentity, viewport: Viewport) -> Self {
        Self {
            user_agent: identity.user_agent.to_string(),
            viewport,
            headers: generate_headers(identity),
        }
    }

    /// Headers for a request sent through our own HTTP client
    ///
    /// `Accept-Encoding` is left out so the client negotiates compression and
    /// decodes the body itself.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                continue;
            };
            if name == ACCEPT_ENCODING {
                continue;
            }
            map.insert(name, value);
        }
        map
    }
}

/// Builds the header set a real browser of this identity would send
pub fn generate_headers(identity: &BrowserIdentity) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    let mut set = |name: &str, value: &str| {
        headers.insert(name.to_string(), value.to_string());
    };

    set("User-Agent", identity.user_agent);
    set(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    );
    set("Accept-Language", "en-US,en;q=0.9");
    set("Accept-Encoding", "gzip, deflate, br");
    set("Cache-Control", "max-age=0");
    set("Sec-Fetch-Dest", "document");
    set("Sec-Fetch-Mode", "navigate");
    set("Sec-Fetch-Site", "none");
    set("Sec-Fetch-User", "?1");
    set("Upgrade-Insecure-Requests", "1");

    if identity.family.sends_client_hints() {
        let brands = match identity.family {
            BrowserFamily::Edge => {
                "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Microsoft Edge\";v=\"120\""
            }
            _ => "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"",
        };
        set("Sec-Ch-Ua", brands);
        set("Sec-Ch-Ua-Mobile", "?0");
        set("Sec-Ch-Ua-Platform", identity.platform);
    }

    headers
}
