//! Shared configuration constants for autoimage
//!
//! Default values used by the configuration layer, the fetcher and the
//! document parser.

/// Default class value of the injected `<img>` element
pub const DEFAULT_IMAGE_CLASS: &str = "auto-image-grabber alignright";

/// Default query selecting the outbound link: the first anchor in the content
pub const DEFAULT_DESTINATION_QUERY: &str = "//a[1]";

/// Default fetch timeout: 5 seconds
///
/// The fetch happens while the host is rendering a page, so a slow remote
/// host must not hold the request for long. A timeout is handled like any
/// other fetch failure: the content is returned unchanged.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// Maximum HTML input size accepted by the parser (10 MB)
///
/// Also the default cap on a fetched page body.
/// - Wikipedia largest articles: ~2-3 MB
/// - Typical news article: 200 KB - 1 MB
pub const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Maximum nesting of predicates and parentheses in an XPath query
pub const MAX_QUERY_DEPTH: usize = 32;
