//! Parsed HTML documents and the elements matched inside them.
//!
//! A [`ParsedDocument`] owns one html5ever tree. Elements found in it are
//! handed out as [`MatchedElement`]s that borrow the document, so a match
//! can never outlive the tree it points into. When a match has to leave the
//! scope owning the document (the fetched page is parsed inside the main
//! image finder), it is copied into an owned [`ElementSnapshot`].

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::cell::OnceCell;
use std::collections::HashMap;

use crate::errors::{GrabError, GrabResult};
use crate::utils::constants::MAX_HTML_SIZE;

/// Attribute lookup capability shared by borrowed and owned elements
pub trait AttributeSource {
    /// Value of the named attribute; names are matched ASCII case-insensitively
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Attribute value, treating an empty value as absent
    fn non_empty_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).filter(|value| !value.is_empty())
    }
}

/// A parsed HTML tree for one content string
pub struct ParsedDocument {
    html: Html,
    order: OnceCell<HashMap<NodeId, usize>>,
}

impl std::fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("nodes", &self.html.tree.root().descendants().count())
            .finish()
    }
}

/// Parse an HTML string into a queryable document.
///
/// Malformed markup never fails: html5ever recovers the way browsers do.
/// Only input that cannot yield any usable tree is rejected: empty or
/// whitespace-only input, and input over [`MAX_HTML_SIZE`].
pub fn parse(html: &str) -> GrabResult<ParsedDocument> {
    if html.trim().is_empty() {
        return Err(GrabError::ParseFailure("document is empty".to_string()));
    }

    if html.len() > MAX_HTML_SIZE {
        return Err(GrabError::ParseFailure(format!(
            "document too large: {} bytes exceeds limit of {} bytes",
            html.len(),
            MAX_HTML_SIZE
        )));
    }

    let html = Html::parse_document(html);
    if !html.errors.is_empty() {
        log::trace!("Parsed document with {} recovered errors", html.errors.len());
    }

    Ok(ParsedDocument {
        html,
        order: OnceCell::new(),
    })
}

impl ParsedDocument {
    /// The underlying scraper document
    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The document node (parent of `<html>`)
    pub(crate) fn root(&self) -> NodeRef<'_, Node> {
        self.html.tree.root()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Position of a node in document order, computed once per document
    pub(crate) fn document_position(&self, id: NodeId) -> usize {
        let order = self.order.get_or_init(|| {
            self.html
                .tree
                .root()
                .descendants()
                .enumerate()
                .map(|(index, node)| (node.id(), index))
                .collect()
        });
        order.get(&id).copied().unwrap_or(usize::MAX)
    }

    /// Sort node ids into document order and drop duplicates
    pub(crate) fn sort_document_order(&self, ids: &mut Vec<NodeId>) {
        ids.sort_by_key(|id| self.document_position(*id));
        ids.dedup();
    }

    /// Wrap a node id as a matched element, if it is an element
    pub(crate) fn element(&self, id: NodeId) -> Option<MatchedElement<'_>> {
        self.node(id)
            .and_then(ElementRef::wrap)
            .map(MatchedElement::new)
    }
}

/// An element inside a [`ParsedDocument`]
#[derive(Debug, Clone, Copy)]
pub struct MatchedElement<'doc> {
    element: ElementRef<'doc>,
}

impl<'doc> MatchedElement<'doc> {
    pub(crate) fn new(element: ElementRef<'doc>) -> Self {
        Self { element }
    }

    /// Lowercase tag name
    #[must_use]
    pub fn name(&self) -> &'doc str {
        self.element.value().name()
    }

    /// The underlying scraper element
    #[must_use]
    pub fn element_ref(&self) -> ElementRef<'doc> {
        self.element
    }

    /// Concatenated text of the element's descendants
    #[must_use]
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Copy name and attributes out of the document
    #[must_use]
    pub fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            name: self.name().to_string(),
            attributes: self
                .element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl AttributeSource for MatchedElement<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.element
            .value()
            .attrs()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Owned copy of an element's name and attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    name: String,
    attributes: Vec<(String, String)>,
}

impl ElementSnapshot {
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

impl AttributeSource for ElementSnapshot {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_parse_failure() {
        assert!(matches!(parse(""), Err(GrabError::ParseFailure(_))));
        assert!(matches!(parse("  \n\t "), Err(GrabError::ParseFailure(_))));
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let doc = parse("<div><p>unclosed <b>bold <img src=x.png").expect("recoverable markup");
        let img = doc
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "img")
            .map(MatchedElement::new)
            .expect("img survives recovery");
        assert_eq!(img.attribute("src"), Some("x.png"));
    }

    #[test]
    fn test_plain_text_parses_to_document_without_elements_of_interest() {
        let doc = parse("just some words").expect("text is a document");
        assert!(
            doc.root()
                .descendants()
                .filter_map(ElementRef::wrap)
                .all(|el| matches!(el.value().name(), "html" | "head" | "body"))
        );
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let doc = parse(r#"<img SRC="/a.jpg" alt="">"#).expect("parse");
        let img = doc
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "img")
            .map(MatchedElement::new)
            .expect("img");

        assert_eq!(img.attribute("src"), Some("/a.jpg"));
        assert_eq!(img.attribute("Src"), Some("/a.jpg"));
        assert_eq!(img.attribute("alt"), Some(""));
        assert_eq!(img.non_empty_attribute("alt"), None);
        assert_eq!(img.attribute("title"), None);

        let snapshot = img.snapshot();
        assert_eq!(snapshot.name(), "img");
        assert_eq!(snapshot.attribute("SRC"), Some("/a.jpg"));
    }

    #[test]
    fn test_document_order_positions() {
        let doc = parse("<p id=a></p><p id=b></p>").expect("parse");
        let mut ids: Vec<NodeId> = doc
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "p")
            .map(|el| el.id())
            .collect();
        let first = ids[0];
        ids.reverse();
        ids.push(first);
        doc.sort_document_order(&mut ids);
        assert_eq!(ids.len(), 2);
        let first_id = doc
            .element(ids[0])
            .and_then(|el| el.attribute("id").map(str::to_string));
        assert_eq!(first_id.as_deref(), Some("a"));
    }
}
