use crate::url::LinkFilter;
use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a raw href found on `base` into an absolute crawl candidate
///
/// # Normalization Steps
///
/// 1. Reject empty hrefs and bare fragments (`#...`)
/// 2. Accept `http:`/`https:` hrefs (lowercase only) as absolute; reject any
///    other `scheme:` prefix (`mailto:`, `javascript:`, `HTTP:`, ...)
/// 3. Protocol-relative hrefs (`//host/...`) get the base's scheme
/// 4. Root-relative hrefs (`/...`) get the base's scheme and authority
/// 5. Anything else is joined to the full base URL with a `/` (plain
///    concatenation, not RFC 3986 merging)
/// 6. Parse; a URL without a host inherits the base host
/// 7. Remove the fragment
/// 8. Same host as the base: inherit the base's scheme and credentials
/// 9. Apply the filter
///
/// # Arguments
///
/// * `base` - The page the href was found on
/// * `raw` - The href as written in the document
/// * `filter` - Predicate deciding whether the candidate may be crawled
///
/// # Returns
///
/// * `Ok(Url)` - Absolute, fragment-free candidate URL
/// * `Err(UrlError)` - Why the href is not a crawl candidate
///
/// # Examples
///
/// ```
/// use sitewalk::url::{normalize, same_host};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let url = normalize(&base, "//example.com/b#top", &same_host).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/b");
/// assert!(normalize(&base, "mailto:x@y.z", &same_host).is_err());
/// ```
pub fn normalize(base: &Url, raw: &str, filter: &dyn LinkFilter) -> UrlResult<Url> {
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    if raw.starts_with('#') {
        return Err(UrlError::Fragment(raw.to_string()));
    }

    let parsed = match scheme_prefix(raw) {
        Some("http" | "https") => Url::parse(raw),
        Some(scheme) => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
        None if raw.starts_with("//") => Url::parse(&format!("{}:{}", base.scheme(), raw)),
        None if raw.starts_with('/') => base.join(raw),
        None => Url::parse(&format!("{}/{}", base.as_str(), raw)),
    };

    let mut url = parsed.map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.host().is_none() {
        url.set_host(base.host_str())
            .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    }

    url.set_fragment(None);

    if crate::url::same_host(base, &url) {
        inherit_scheme_and_credentials(base, &mut url);
    }

    if !filter.allow(base, &url) {
        return Err(UrlError::Filtered(url.to_string()));
    }

    Ok(url)
}

/// Returns the scheme of a `scheme:`-prefixed href (letters only)
fn scheme_prefix(raw: &str) -> Option<&str> {
    let (scheme, _) = raw.split_once(':')?;
    if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(scheme)
    } else {
        None
    }
}

fn inherit_scheme_and_credentials(base: &Url, url: &mut Url) {
    if url.scheme() != base.scheme() && url.set_scheme(base.scheme()).is_err() {
        tracing::trace!("Cannot switch {} to scheme {}", url, base.scheme());
    }

    if base.username().is_empty() && base.password().is_none() {
        return;
    }

    // Both calls only fail for URLs that cannot carry credentials
    let _ = url.set_username(base.username());
    let _ = url.set_password(base.password());
}
