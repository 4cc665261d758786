//! XPath 1.0 subset evaluated over scraper's html5ever tree.
//!
//! Supports what main-image patterns use in practice: absolute and relative
//! location paths, `//`, `.`, `..`, `*`, `node()`, the child, descendant,
//! descendant-or-self, self and parent axes, unions, parenthesized filter
//! expressions, and predicates built from positions, attributes, comparisons,
//! `and`/`or` and the functions `contains`, `starts-with`, `not`,
//! `position`, `last`, `normalize-space`, `string`, `count`, `true`, `false`.
//!
//! Positional predicates are counted per context node along the axis, so
//! `//img[1]` selects every image that is the first image child of its parent.

mod eval;
mod lexer;
mod parser;

use ego_tree::NodeId;

use crate::document::ParsedDocument;

/// A compiled XPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    union: parser::Union,
}

impl XPath {
    /// Compile an expression; the error describes the first problem found
    pub fn compile(source: &str) -> Result<Self, String> {
        let tokens = lexer::tokenize(source)?;
        let union = parser::parse(&tokens)?;
        Ok(Self {
            source: source.to_string(),
            union,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matching elements in document order
    pub(crate) fn select(&self, doc: &ParsedDocument) -> Vec<NodeId> {
        eval::Evaluator::new(doc).select(&self.union)
    }
}
