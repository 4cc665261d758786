//! Structural queries: XPath expressions and CSS selectors.
//!
//! Dialect selection for a query string:
//! 1. an explicit `xpath:` or `css:` prefix wins;
//! 2. anything starting with `/`, `(`, `./` or `..` is XPath;
//! 3. otherwise CSS is tried first and XPath second (`img.lead` is CSS,
//!    `html/body//img` is XPath).

pub mod xpath;

use scraper::Selector;

use crate::document::{MatchedElement, ParsedDocument};
use crate::errors::{GrabError, GrabResult};
pub use xpath::XPath;

/// A compiled structural query
#[derive(Debug, Clone)]
pub enum Query {
    XPath(XPath),
    Css(Selector),
}

impl Query {
    /// Compile a query string, picking its dialect
    pub fn compile(source: &str) -> GrabResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(GrabError::invalid_query(source, "empty query"));
        }

        if let Some(rest) = trimmed.strip_prefix("xpath:") {
            return Self::compile_xpath(rest.trim(), source);
        }
        if let Some(rest) = trimmed.strip_prefix("css:") {
            return Self::compile_css(rest.trim(), source);
        }
        if trimmed.starts_with(['/', '(']) || trimmed.starts_with("./") || trimmed.starts_with("..") {
            return Self::compile_xpath(trimmed, source);
        }

        Self::compile_css(trimmed, source).or_else(|css_error| {
            Self::compile_xpath(trimmed, source).map_err(|xpath_error| {
                let reason = match (css_error, xpath_error) {
                    (
                        GrabError::InvalidQuery { reason: css, .. },
                        GrabError::InvalidQuery { reason: xpath, .. },
                    ) => format!("not a CSS selector ({css}) nor an XPath expression ({xpath})"),
                    (_, other) => other.to_string(),
                };
                GrabError::invalid_query(source, reason)
            })
        })
    }

    fn compile_xpath(expression: &str, source: &str) -> GrabResult<Self> {
        XPath::compile(expression)
            .map(Query::XPath)
            .map_err(|reason| GrabError::invalid_query(source, reason))
    }

    fn compile_css(selector: &str, source: &str) -> GrabResult<Self> {
        Selector::parse(selector)
            .map(Query::Css)
            .map_err(|e| GrabError::invalid_query(source, e.to_string()))
    }

    /// All matching elements in document order
    pub fn select<'doc>(&self, doc: &'doc ParsedDocument) -> Vec<MatchedElement<'doc>> {
        match self {
            Query::XPath(xpath) => xpath
                .select(doc)
                .into_iter()
                .filter_map(|node| doc.element(node))
                .collect(),
            Query::Css(selector) => doc.html().select(selector).map(MatchedElement::new).collect(),
        }
    }

    /// The first matching element in document order
    pub fn first<'doc>(&self, doc: &'doc ParsedDocument) -> Option<MatchedElement<'doc>> {
        match self {
            Query::XPath(xpath) => xpath
                .select(doc)
                .into_iter()
                .find_map(|node| doc.element(node)),
            Query::Css(selector) => doc.html().select(selector).next().map(MatchedElement::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AttributeSource, parse};

    #[test]
    fn test_dialect_selection() {
        assert!(matches!(Query::compile("//a[1]"), Ok(Query::XPath(_))));
        assert!(matches!(Query::compile("(//img)[1]"), Ok(Query::XPath(_))));
        assert!(matches!(Query::compile(".//img"), Ok(Query::XPath(_))));
        assert!(matches!(Query::compile("div.entry img"), Ok(Query::Css(_))));
        assert!(matches!(Query::compile(".entry img"), Ok(Query::Css(_))));
        assert!(matches!(Query::compile("html/body//img"), Ok(Query::XPath(_))));
        assert!(matches!(Query::compile("xpath:img"), Ok(Query::XPath(_))));
        assert!(matches!(Query::compile("css: a[href]"), Ok(Query::Css(_))));
    }

    #[test]
    fn test_invalid_queries() {
        for query in ["", "   ", "//img[", "css://a", "a[[["] {
            assert!(
                matches!(Query::compile(query), Err(GrabError::InvalidQuery { .. })),
                "expected invalid query: {query:?}"
            );
        }
    }

    #[test]
    fn test_css_and_xpath_agree_on_first_match() {
        let doc = parse(r#"<div class="entry"><p><img src="/a.jpg"></p><img src="/b.jpg"></div>"#)
            .expect("parse");

        let css = Query::compile(".entry img").expect("css");
        let xpath = Query::compile(r#"//*[@class="entry"]//img"#).expect("xpath");

        let from_css = css.first(&doc).expect("css match");
        let from_xpath = xpath.first(&doc).expect("xpath match");
        assert_eq!(from_css.attribute("src"), Some("/a.jpg"));
        assert_eq!(from_xpath.attribute("src"), Some("/a.jpg"));
        assert_eq!(css.select(&doc).len(), 2);
        assert_eq!(xpath.select(&doc).len(), 2);
    }
}
