//! Prepending a destination page's main image to article content.
//!
//! One pass: find the outbound link in the content, fetch the page it points
//! to, match its main image, deep-link the image URL and render an `<img>`
//! block in front of the content. Any failure along the way leaves the
//! content exactly as it was.

use html_escape::encode_double_quoted_attribute;
use url::Url;

use crate::config::GrabberConfig;
use crate::destination::find_destination;
use crate::document::AttributeSource;
use crate::errors::{GrabError, GrabResult};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::main_image::find_main_image;
use crate::utils::{join_destination, resolve};

/// Runs augmentation passes with a given page fetcher
#[derive(Debug, Clone)]
pub struct Augmenter<F> {
    fetcher: F,
}

impl<F: PageFetcher> Augmenter<F> {
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Augment `content`, or return it unchanged when no image can be found.
    ///
    /// `context_is_eligible` tells whether the host is rendering a single
    /// item; see [`GrabberConfig::single_view_only`].
    pub async fn augment(
        &self,
        content: &str,
        config: &GrabberConfig,
        context_is_eligible: bool,
    ) -> String {
        match self.try_augment(content, config, context_is_eligible).await {
            Ok(augmented) => augmented,
            Err(e) => {
                log::debug!("Content left unchanged: {e}");
                content.to_string()
            }
        }
    }

    /// Like [`Augmenter::augment`], but reports why nothing was added.
    ///
    /// An ineligible context is not an error: the content comes back as is.
    pub async fn try_augment(
        &self,
        content: &str,
        config: &GrabberConfig,
        context_is_eligible: bool,
    ) -> GrabResult<String> {
        if config.single_view_only() && !context_is_eligible {
            log::trace!("Skipping augmentation outside single view");
            return Ok(content.to_string());
        }

        let destination = locate_destination(content, config)?;
        log::debug!("Destination page: {destination}");

        let image =
            find_main_image(&self.fetcher, &destination, config.image_queries()).await?;

        let src = image.non_empty_attribute("src").ok_or_else(|| {
            log::debug!("Main image <{}> on {destination} has no src", image.name());
            GrabError::NotFound
        })?;
        let alt = image.attribute("alt").unwrap_or_default();
        let src = resolve(src, destination.as_str());

        Ok(format!(
            "{}{content}",
            render_image_block(config.image_class(), &src, alt)
        ))
    }
}

/// Find the destination link and make it a fetchable absolute URL
fn locate_destination(content: &str, config: &GrabberConfig) -> GrabResult<Url> {
    let href = find_destination(content, config.destination_query())?;
    join_destination(&href, config.site_url())
}

/// Render the injected paragraph; values are escaped for double-quoted attributes
fn render_image_block(class: &str, src: &str, alt: &str) -> String {
    format!(
        r#"<p><img class="{}" src="{}" alt="{}" /></p>"#,
        encode_double_quoted_attribute(class),
        encode_double_quoted_attribute(src),
        encode_double_quoted_attribute(alt),
    )
}

/// Augment `content` using an HTTP fetcher built from `config`.
///
/// # Example
/// ```rust,no_run
/// # async fn run() {
/// use autoimage::{GrabberConfig, augment_content};
///
/// let config = GrabberConfig::default();
/// let html = augment_content(r#"<a href="https://example.com/post">via</a>"#, &config, true).await;
/// println!("{html}");
/// # }
/// ```
pub async fn augment_content(
    content: &str,
    config: &GrabberConfig,
    context_is_eligible: bool,
) -> String {
    match HttpFetcher::new(config.fetch()) {
        Ok(fetcher) => {
            Augmenter::new(fetcher)
                .augment(content, config, context_is_eligible)
                .await
        }
        Err(e) => {
            log::warn!("Failed to build HTTP client: {e}");
            content.to_string()
        }
    }
}
