//! Browser impersonation headers sent with every request.

use reqwest::header::{self, HeaderMap, HeaderValue};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:84.0) Gecko/20100101 Firefox/84.0";

pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub const CACHE_CONTROL: &str = "max-age=0";

pub const UPGRADE_INSECURE_REQUESTS: &str = "1";

/// Headers a desktop Firefox sends on a top-level navigation.
/// The User-Agent is set separately on the client builder.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static(UPGRADE_INSECURE_REQUESTS),
    );
    headers
}
