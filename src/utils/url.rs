//! Relative URL resolution.

use url::Url;

/// Resolve a possibly-relative reference against the URL of the page it was found on.
///
/// Absolute references replace the base entirely; scheme-relative, path-absolute
/// and path-relative references are merged per RFC 3986.
pub fn resolve(base: &Url, candidate: &str) -> Result<Url, url::ParseError> {
    base.join(candidate)
}
