//! Link filter predicates
//!
//! A filter decides, for a page being crawled (`base`) and an already
//! normalized candidate link, whether the candidate may enter the frontier.

use url::Url;

/// Predicate over `(base, candidate)` applied to every normalized link
///
/// Any `Fn(&Url, &Url) -> bool` closure is a filter, so alternative policies
/// (scheme restriction, path prefix, ...) need no new types:
///
/// ```
/// use sitewalk::url::LinkFilter;
/// use url::Url;
///
/// let docs_only = |_: &Url, candidate: &Url| candidate.path().starts_with("/docs/");
/// let base = Url::parse("https://example.com/").unwrap();
/// let link = Url::parse("https://example.com/docs/intro").unwrap();
/// assert!(docs_only.allow(&base, &link));
/// ```
pub trait LinkFilter: Send + Sync {
    /// Returns true if `candidate`, found on `base`, should be crawled
    fn allow(&self, base: &Url, candidate: &Url) -> bool;
}

impl<F> LinkFilter for F
where
    F: Fn(&Url, &Url) -> bool + Send + Sync,
{
    fn allow(&self, base: &Url, candidate: &Url) -> bool {
        self(base, candidate)
    }
}

/// Accepts candidates on the same host (and explicit port) as the base
pub fn same_host(base: &Url, candidate: &Url) -> bool {
    base.host_str() == candidate.host_str() && base.port() == candidate.port()
}

/// Accepts every candidate
pub fn any_host(_base: &Url, _candidate: &Url) -> bool {
    true
}
