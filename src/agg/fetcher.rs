//! RSS feed fetcher.
//!
//! One bounded-timeout GET per call, full-body read, RSS 2.0 decode. Text
//! fields are HTML-unescaped after decoding because feeds frequently
//! double-encode entities. Retry policy belongs to the caller; none is
//! applied here.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use rss::Channel;
use thiserror::Error;

/// User agent string identifying the client.
pub const USER_AGENT: &str = "gator";

/// Total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a fetch failed. Transport failures stay distinguishable from a
/// structurally invalid document.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Http(StatusCode),

    /// The body is not a well-formed RSS document.
    #[error("malformed feed document: {0}")]
    Malformed(#[from] rss::Error),
}

/// A fully decoded feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in document order.
    pub items: Vec<RawItem>,
}

/// One `<item>` as decoded from the document. Lives only within one fetch
/// cycle; the publish date stays a raw string for the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Raw `<pubDate>` text; empty if the item carried none.
    pub pub_date: String,
}

/// RSS feed fetcher with a fixed timeout.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self { client })
    }

    /// Fetch and decode the feed at `url`.
    ///
    /// No partial results: either a fully parsed document or an error.
    pub async fn fetch(&self, url: &str) -> Result<RawFeed, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status()));
        }

        // Feed documents are small; read the whole body.
        let bytes = response.bytes().await.map_err(classify)?;

        parse_document(&bytes)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e)
    }
}

/// Decode document bytes into a RawFeed, unescaping HTML entities in the
/// channel and item text fields.
pub fn parse_document(bytes: &[u8]) -> Result<RawFeed, FetchError> {
    let channel = Channel::read_from(bytes)?;

    let items = channel
        .items()
        .iter()
        .map(|item| RawItem {
            title: unescape(item.title().unwrap_or_default()),
            link: item.link().unwrap_or_default().to_string(),
            description: unescape(item.description().unwrap_or_default()),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    Ok(RawFeed {
        title: unescape(channel.title()),
        link: channel.link().to_string(),
        description: unescape(channel.description()),
        items,
    })
}

/// Decode HTML entities in text.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in text.chars() {
        match ch {
            '&' => {
                if in_entity {
                    result.push('&');
                    result.push_str(&entity);
                }
                in_entity = true;
                entity.clear();
            }
            ';' if in_entity => {
                in_entity = false;
                match entity.as_str() {
                    "amp" => result.push('&'),
                    "lt" => result.push('<'),
                    "gt" => result.push('>'),
                    "quot" => result.push('"'),
                    "apos" => result.push('\''),
                    "nbsp" => result.push(' '),
                    _ if entity.starts_with('#') => {
                        // Numeric entity
                        match parse_numeric_entity(&entity).and_then(char::from_u32) {
                            Some(c) => result.push(c),
                            None => {
                                result.push('&');
                                result.push_str(&entity);
                                result.push(';');
                            }
                        }
                    }
                    _ => {
                        // Unknown entity, keep as-is
                        result.push('&');
                        result.push_str(&entity);
                        result.push(';');
                    }
                }
            }
            _ if in_entity => {
                if ch.is_ascii_alphanumeric() || ch == '#' {
                    entity.push(ch);
                } else {
                    // Not an entity after all
                    result.push('&');
                    result.push_str(&entity);
                    result.push(ch);
                    in_entity = false;
                }
            }
            _ => result.push(ch),
        }
    }

    if in_entity {
        result.push('&');
        result.push_str(&entity);
    }

    result
}

/// Parse a numeric HTML entity (e.g., "#39" or "#x27").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if entity.starts_with("#x") || entity.starts_with("#X") {
        u32::from_str_radix(&entity[2..], 16).ok()
    } else if let Some(digits) = entity.strip_prefix('#') {
        digits.parse().ok()
    } else {
        None
    }
}
