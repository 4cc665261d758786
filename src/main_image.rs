//! Locating the main image of a destination page.

use url::Url;

use crate::document::{ElementSnapshot, MatchedElement, ParsedDocument, parse};
use crate::errors::{GrabError, GrabResult};
use crate::fetch::PageFetcher;
use crate::matcher::first_match_with_index;

/// Find the main image inside an already parsed page
pub fn locate_main_image<'doc, S: AsRef<str>>(
    doc: &'doc ParsedDocument,
    queries: &[S],
) -> Option<MatchedElement<'doc>> {
    let (index, element) = first_match_with_index(doc, queries)?;
    log::debug!("Main image found by query #{index}");
    Some(element)
}

/// Fetch `destination` and return a copy of its main image element.
///
/// Performs exactly one GET. The fetched document lives only inside this
/// call, so the match is returned as an owned [`ElementSnapshot`].
pub async fn find_main_image<F, S>(
    fetcher: &F,
    destination: &Url,
    queries: &[S],
) -> GrabResult<ElementSnapshot>
where
    F: PageFetcher,
    S: AsRef<str> + Sync,
{
    let body = fetcher.fetch(destination).await.map_err(|e| {
        log::warn!("Failed to fetch {destination}: {e}");
        GrabError::from(e)
    })?;

    let doc = parse(&body)?;
    locate_main_image(&doc, queries)
        .map(|element| element.snapshot())
        .ok_or(GrabError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AttributeSource;
    use crate::errors::FetchError;
    use std::sync::Mutex;

    struct StubFetcher {
        response: Result<String, FetchError>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(response: Result<&str, FetchError>) -> Self {
            Self {
                response: response.map(str::to_string),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.requested
                .lock()
                .expect("lock poisoned")
                .push(url.to_string());
            self.response.clone()
        }
    }

    fn destination() -> Url {
        Url::parse("https://news.example.com/story").expect("valid url")
    }

    #[tokio::test]
    async fn test_finds_image_with_one_fetch() {
        let fetcher = StubFetcher::new(Ok(
            r#"<div class="entry"><p>x</p><img src="/img/a.jpg" alt="A"></div>"#,
        ));
        let image = find_main_image(&fetcher, &destination(), &[r#"//*[@class="entry"]//img[1]"#])
            .await
            .expect("image");

        assert_eq!(image.name(), "img");
        assert_eq!(image.attribute("src"), Some("/img/a.jpg"));
        assert_eq!(image.attribute("alt"), Some("A"));
        assert_eq!(
            *fetcher.requested.lock().expect("lock poisoned"),
            vec!["https://news.example.com/story".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let fetcher = StubFetcher::new(Err(FetchError::Status(500)));
        let result = find_main_image(&fetcher, &destination(), &["//img[1]"]).await;
        assert!(matches!(
            result,
            Err(GrabError::FetchFailure(FetchError::Status(500)))
        ));
    }

    #[tokio::test]
    async fn test_empty_page_and_no_match() {
        let empty = StubFetcher::new(Ok(""));
        assert!(matches!(
            find_main_image(&empty, &destination(), &["//img[1]"]).await,
            Err(GrabError::ParseFailure(_))
        ));

        let no_images = StubFetcher::new(Ok("<p>text only</p>"));
        assert!(matches!(
            find_main_image(&no_images, &destination(), &["//img[1]"]).await,
            Err(GrabError::NotFound)
        ));

        let queries: [&str; 0] = [];
        let with_image = StubFetcher::new(Ok(r#"<img src="/a.jpg">"#));
        assert!(matches!(
            find_main_image(&with_image, &destination(), &queries).await,
            Err(GrabError::NotFound)
        ));
    }
}
