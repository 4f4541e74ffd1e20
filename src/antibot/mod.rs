//! Request shaping for outbound scrapes
//!
//! Every scrape goes out looking like a desktop browser: a user agent from a
//! small rotation pool, a common screen size and a header set consistent with
//! that browser. Politeness (pacing, robots.txt) lives in
//! [`state::DomainPacer`](crate::state::DomainPacer) and [`robots`](crate::robots).

mod fingerprint;

pub use fingerprint::{
    generate_headers, BrowserFamily, BrowserIdentity, BrowserProfile, Viewport,
    BROWSER_IDENTITIES, VIEWPORTS,
};
