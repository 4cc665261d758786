//! Ordered pattern matching: the first query that matches anything wins.

use crate::document::{MatchedElement, ParsedDocument};
use crate::query::Query;

/// Return the first element matched by the first query that yields a result.
///
/// Queries are evaluated in order and evaluation stops at the first query
/// with at least one match; only that query's first element (document order)
/// is returned. Queries that fail to compile are logged and skipped.
pub fn first_match<'doc, S: AsRef<str>>(
    doc: &'doc ParsedDocument,
    queries: &[S],
) -> Option<MatchedElement<'doc>> {
    first_match_with_index(doc, queries).map(|(_, element)| element)
}

/// Like [`first_match`], also returning the index of the winning query
pub fn first_match_with_index<'doc, S: AsRef<str>>(
    doc: &'doc ParsedDocument,
    queries: &[S],
) -> Option<(usize, MatchedElement<'doc>)> {
    for (index, source) in queries.iter().enumerate() {
        let source = source.as_ref();
        let query = match Query::compile(source) {
            Ok(query) => query,
            Err(e) => {
                log::debug!("Skipping image query #{index}: {e}");
                continue;
            }
        };

        if let Some(element) = query.first(doc) {
            log::trace!("Query #{index} '{source}' matched <{}>", element.name());
            return Some((index, element));
        }
        log::trace!("Query #{index} '{source}' matched nothing");
    }

    None
}
