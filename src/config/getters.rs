//! Getter methods for `GrabberConfig` and `FetchSettings`

use std::time::Duration;

use super::types::{FetchSettings, GrabberConfig};

impl GrabberConfig {
    #[must_use]
    pub fn image_class(&self) -> &str {
        &self.image_class
    }

    #[must_use]
    pub fn destination_query(&self) -> &str {
        &self.destination_query
    }

    #[must_use]
    pub fn image_queries(&self) -> &[String] {
        &self.image_queries
    }

    #[must_use]
    pub fn site_url(&self) -> Option<&str> {
        self.site_url.as_deref()
    }

    #[must_use]
    pub fn single_view_only(&self) -> bool {
        self.single_view_only
    }

    #[must_use]
    pub fn fetch(&self) -> &FetchSettings {
        &self.fetch
    }
}

impl FetchSettings {
    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn max_page_size_bytes(&self) -> usize {
        self.max_page_size_bytes
    }

    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}
