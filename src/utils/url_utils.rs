//! URL utilities.
//!
//! `resolve` deep-links an image source found on a remote page; it rewrites
//! only path-absolute sources (`/img/a.jpg`). Other relative forms such as
//! `../a.jpg` and protocol-relative `//cdn/a.jpg` are passed through
//! unchanged, which is a known limitation kept for compatibility with
//! existing image pattern setups.
//!
//! `join_destination` turns the raw `href` of the outbound link into a
//! fetchable URL and uses full RFC 3986 joining.

use url::{ParseError, Url};

use crate::errors::{GrabError, GrabResult};

/// Make a path-absolute URL fully qualified using the referrer's origin.
///
/// Returns `candidate` unchanged unless it starts with exactly one `/`.
/// The referrer's port is kept when it is not the scheme default.
///
/// ```
/// use autoimage::utils::resolve;
///
/// assert_eq!(
///     resolve("/foo/bar.jpg", "http://example.com/x"),
///     "http://example.com/foo/bar.jpg"
/// );
/// assert_eq!(resolve("../rel/a.jpg", "http://example.com/x"), "../rel/a.jpg");
/// ```
#[must_use]
pub fn resolve(candidate: &str, referrer: &str) -> String {
    if !is_path_absolute(candidate) {
        return candidate.to_string();
    }

    match origin_prefix(referrer) {
        Some(prefix) => format!("{prefix}{candidate}"),
        None => {
            log::debug!("Referrer '{referrer}' has no usable origin, leaving '{candidate}' as is");
            candidate.to_string()
        }
    }
}

fn is_path_absolute(candidate: &str) -> bool {
    candidate.starts_with('/') && !candidate.starts_with("//")
}

/// `scheme://host[:port]` of a URL, if it has a host
fn origin_prefix(referrer: &str) -> Option<String> {
    let url = Url::parse(referrer).ok()?;
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

/// Check if a URL can be fetched over HTTP
#[must_use]
pub fn is_fetchable_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// Turn a destination `href` into an absolute, fetchable URL.
///
/// Absolute hrefs are used as is. Relative hrefs need `site_url` to join
/// against; without one there is no destination to fetch.
pub fn join_destination(href: &str, site_url: Option<&str>) -> GrabResult<Url> {
    let url = match Url::parse(href) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let Some(site_url) = site_url else {
                return Err(GrabError::InvalidUrl(format!(
                    "relative destination '{href}' and no site URL configured"
                )));
            };
            let base = Url::parse(site_url)
                .map_err(|e| GrabError::InvalidUrl(format!("site URL '{site_url}': {e}")))?;
            base.join(href)
                .map_err(|e| GrabError::InvalidUrl(format!("'{href}' against '{site_url}': {e}")))?
        }
        Err(e) => return Err(GrabError::InvalidUrl(format!("'{href}': {e}"))),
    };

    if is_fetchable_url(&url) {
        Ok(url)
    } else {
        Err(GrabError::InvalidUrl(format!("'{url}' is not an http(s) URL")))
    }
}
