//! Fetching the destination page.
//!
//! [`PageFetcher`] is the seam between the augmenter and the network; the
//! production implementation is [`HttpFetcher`]. A fetch is a single GET
//! with no retries and no caching. The body is streamed with a size cap and
//! decoded with the charset the server declares, falling back to UTF-8 and
//! then Windows-1252.

use futures::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::borrow::Cow;
use std::future::Future;
use url::Url;

use crate::config::FetchSettings;
use crate::errors::FetchError;

/// Retrieves the HTML of a page
pub trait PageFetcher {
    /// Fetch `url` and return its body; any failure is a [`FetchError`]
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_size: usize,
    user_agent: Option<String>,
}

impl HttpFetcher {
    /// Build a fetcher whose requests are bounded by `settings.timeout()`
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self::with_client(client, settings))
    }

    /// Use an existing client; its own timeout configuration applies
    #[must_use]
    pub fn with_client(client: Client, settings: &FetchSettings) -> Self {
        Self {
            client,
            max_body_size: settings.max_page_size_bytes(),
            user_agent: settings.user_agent().map(str::to_string),
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut request = self.client.get(url.clone());
        if let Some(user_agent) = &self.user_agent {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type)
            .map(str::to_string);

        // Enforce the limit before downloading when the server announces a length
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_body_size as u64 {
            return Err(FetchError::TooLarge {
                limit: self.max_body_size,
            });
        }

        let mut buffer = Vec::with_capacity(expected_size as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > self.max_body_size {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("Fetched {} bytes from {url}", buffer.len());
        Ok(decode_body(&buffer, charset.as_deref()).into_owned())
    }
}

/// The `charset` parameter of a `Content-Type` value
fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
            .filter(|value| !value.is_empty())
    })
}

/// Decode a page body.
///
/// A declared charset that `encoding_rs` knows wins (a BOM still overrides
/// it). Without one the body is read as UTF-8, and as Windows-1252 when it
/// is not valid UTF-8.
pub(crate) fn decode_body<'a>(bytes: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    if let Some(encoding) = charset.and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes())) {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    log::debug!("Body is not valid UTF-8 and declares no charset, reading it as Windows-1252");
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}
