//! Core configuration types for image grabbing
//!
//! The host application owns these values (defaults, persistence, editing);
//! the grabber only reads them, once at the start of each pass.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use url::Url;

use crate::utils::constants::{
    DEFAULT_DESTINATION_QUERY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_IMAGE_CLASS, MAX_HTML_SIZE,
};

/// Default main-image patterns, most specific first
pub const DEFAULT_IMAGE_QUERIES: [&str; 12] = [
    r#"//table[contains(@class, "image")]//img[1]"#,
    r#"//*[@id="content"]//figure//img[1]"#,
    r#"//*[@id="content"]//img[1]"#,
    r#"//*[@id="articlecontent"]//img[contains(@class, "thumb")][1]"#,
    r#"//*[contains(@class, "articleBody")]//img[1]"#,
    r#"//*[contains(@class, "mainimage")]//img[1]"#,
    r#"//*[contains(@class, "content")]//img[1]"#,
    r#"//*[@class="entry"]//img[1]"#,
    r#"//*[@class="entryContent"]//img[1]"#,
    r#"//*[@class="entry-content"]//*[@class="image"]/img[1]"#,
    r#"//*[@class="storyimage"]/img[1]"#,
    r#"//*[contains(@class, "hentry")]//img[1]"#,
];

/// Configuration of the image grabber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabberConfig {
    /// Class attribute of the injected `<img>`
    pub(crate) image_class: String,

    /// Query selecting the outbound link in the article content
    pub(crate) destination_query: String,

    /// Ordered main-image queries; the first one that matches wins.
    ///
    /// Accepts a list or a newline-delimited string when deserialized.
    #[serde(deserialize_with = "deserialize_queries")]
    pub(crate) image_queries: Vec<String>,

    /// Base for relative destination links (usually the site's own URL)
    pub(crate) site_url: Option<String>,

    /// Only augment when the host renders a single item.
    ///
    /// Listing pages would otherwise trigger one remote fetch per item.
    pub(crate) single_view_only: bool,

    pub(crate) fetch: FetchSettings,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            image_class: DEFAULT_IMAGE_CLASS.to_string(),
            destination_query: DEFAULT_DESTINATION_QUERY.to_string(),
            image_queries: DEFAULT_IMAGE_QUERIES.iter().map(|q| (*q).to_string()).collect(),
            site_url: None,
            single_view_only: true,
            fetch: FetchSettings::default(),
        }
    }
}

/// Settings of the destination page fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Whole-request timeout in seconds
    pub(crate) timeout_secs: u64,

    /// Largest accepted page body
    pub(crate) max_page_size_bytes: usize,

    /// `User-Agent` header; none is sent when unset
    pub(crate) user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_page_size_bytes: MAX_HTML_SIZE,
            user_agent: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryList {
    Lines(String),
    List(Vec<String>),
}

fn deserialize_queries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match QueryList::deserialize(deserializer)? {
        QueryList::Lines(text) => split_query_lines(&text),
        QueryList::List(queries) => queries,
    })
}

/// Split newline-delimited queries, dropping blank lines
#[must_use]
pub fn split_query_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl GrabberConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid grabber configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON, image queries as a list
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize grabber configuration")
    }

    /// Override the site URL, e.g. from a command-line flag
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Result<Self> {
        self.site_url = Some(site_url.into());
        self.validate()?;
        Ok(self)
    }

    /// Check values the grabber cannot work with
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(site_url) = &self.site_url {
            let url = Url::parse(site_url)
                .map_err(|e| anyhow!("Invalid site URL '{site_url}': {e}"))?;
            if !crate::utils::is_fetchable_url(&url) {
                return Err(anyhow!("Site URL '{site_url}' must be an http(s) URL"));
            }
        }

        if self.fetch.timeout_secs == 0 {
            return Err(anyhow!("Fetch timeout must be at least 1 second"));
        }

        if self.fetch.max_page_size_bytes == 0 {
            return Err(anyhow!("Maximum page size must be greater than zero"));
        }

        // Bodies over the parser limit are refused by `document::parse`
        if self.fetch.max_page_size_bytes > MAX_HTML_SIZE {
            return Err(anyhow!(
                "Maximum page size {} exceeds the parser limit of {MAX_HTML_SIZE} bytes",
                self.fetch.max_page_size_bytes
            ));
        }

        Ok(())
    }
}
