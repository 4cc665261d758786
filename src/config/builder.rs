//! Fluent builder for `GrabberConfig`
//!
//! Every field has a default, so the builder can be used from any state;
//! `build()` validates the result.

use anyhow::Result;

use super::types::{GrabberConfig, split_query_lines};

#[derive(Debug, Clone, Default)]
pub struct GrabberConfigBuilder {
    config: GrabberConfig,
}

impl GrabberConfig {
    /// Create a builder starting from the default configuration
    #[must_use]
    pub fn builder() -> GrabberConfigBuilder {
        GrabberConfigBuilder::default()
    }
}

impl GrabberConfigBuilder {
    #[must_use]
    pub fn image_class(mut self, class: impl Into<String>) -> Self {
        self.config.image_class = class.into();
        self
    }

    #[must_use]
    pub fn destination_query(mut self, query: impl Into<String>) -> Self {
        self.config.destination_query = query.into();
        self
    }

    /// Replace the image queries; order is priority
    ///
    /// # Example
    /// ```rust
    /// # use autoimage::config::GrabberConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = GrabberConfig::builder()
    ///     .image_queries(["//figure//img[1]", ".hentry img"])
    ///     .build()?;
    /// assert_eq!(config.image_queries().len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn image_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.image_queries = queries.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the image queries with the lines of `text`
    #[must_use]
    pub fn image_query_lines(mut self, text: &str) -> Self {
        self.config.image_queries = split_query_lines(text);
        self
    }

    /// Add a query with the lowest priority
    #[must_use]
    pub fn push_image_query(mut self, query: impl Into<String>) -> Self {
        self.config.image_queries.push(query.into());
        self
    }

    #[must_use]
    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn single_view_only(mut self, enabled: bool) -> Self {
        self.config.single_view_only = enabled;
        self
    }

    #[must_use]
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_page_size_bytes(mut self, bytes: usize) -> Self {
        self.config.fetch.max_page_size_bytes = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = Some(user_agent.into());
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<GrabberConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
