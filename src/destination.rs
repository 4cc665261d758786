//! Finding the page an article points to.

use crate::document::{AttributeSource, parse};
use crate::errors::{GrabError, GrabResult};
use crate::query::Query;

/// Extract the `href` of the first element matched by `query` in `content`.
///
/// The value is returned exactly as written in the markup; making it
/// absolute is up to the caller. Empty content is a parse failure, a missing
/// or empty `href` is [`GrabError::NotFound`].
pub fn find_destination(content: &str, query: &str) -> GrabResult<String> {
    let doc = parse(content)?;
    let query = Query::compile(query)?;

    let link = query.first(&doc).ok_or(GrabError::NotFound)?;
    let href = link.non_empty_attribute("href").ok_or_else(|| {
        log::debug!("Destination element <{}> has no href", link.name());
        GrabError::NotFound
    })?;

    Ok(href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_anchor_href_is_returned_raw() {
        let content = r#"<p>See <a href="/story?id=1&amp;x=2">this</a> and <a href="http://other.example">that</a>.</p>"#;
        assert_eq!(
            find_destination(content, "//a[1]").expect("destination"),
            "/story?id=1&x=2"
        );
    }

    #[test]
    fn test_query_selects_specific_link() {
        let content = r#"<a href="/a">a</a><p class="via"><a href="https://source.example/b">b</a></p>"#;
        assert_eq!(
            find_destination(content, r#"//p[@class="via"]/a"#).expect("destination"),
            "https://source.example/b"
        );
        assert_eq!(
            find_destination(content, "p.via a").expect("css destination"),
            "https://source.example/b"
        );
    }

    #[test]
    fn test_missing_or_empty_href() {
        assert!(matches!(
            find_destination(r#"<a name="top">x</a>"#, "//a[1]"),
            Err(GrabError::NotFound)
        ));
        assert!(matches!(
            find_destination(r#"<a href="">x</a><a href="/later">y</a>"#, "//a[1]"),
            Err(GrabError::NotFound)
        ));
    }

    #[test]
    fn test_no_link_and_empty_content() {
        assert!(matches!(
            find_destination("<p>no links here</p>", "//a[1]"),
            Err(GrabError::NotFound)
        ));
        assert!(matches!(
            find_destination("", "//a[1]"),
            Err(GrabError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_invalid_query() {
        assert!(matches!(
            find_destination(r#"<a href="/a">a</a>"#, "//a[@"),
            Err(GrabError::InvalidQuery { .. })
        ));
    }
}
