use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::domain::DownloadTarget;
use crate::utils::{extract_image_urls, is_image_url};

use super::models::{ClientConfig, MatchResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned error: {0}")]
    HttpStatus(String),

    #[error("Invalid gallery URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// HTTP client for the event photo site: discovers result images on a page
/// and retrieves their binary content.
#[derive(Clone)]
pub struct GalleryClient {
    http: Client,
    config: ClientConfig,
}

impl GalleryClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Enumerate download targets for a pasted URL.
    ///
    /// A direct image URL becomes a single target. Otherwise the page is
    /// fetched once: a find-photos JSON payload is preferred, and any other
    /// body is scraped for img tags. Relative sources are resolved against
    /// the page URL. The list may be empty; the batch reports that case
    /// itself.
    pub async fn discover_targets(&self, input: &str) -> Result<Vec<DownloadTarget>> {
        let page_url = Url::parse(input.trim()).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        if is_image_url(page_url.path()) {
            return Ok(DownloadTarget::numbered([page_url.to_string()]));
        }

        let body = self.fetch_page(&page_url).await?;

        let sources = match serde_json::from_str::<MatchResponse>(&body) {
            Ok(response) if response.success => response
                .matches
                .into_iter()
                .map(|m| m.photo_url)
                .collect::<Vec<_>>(),
            _ => extract_image_urls(&body),
        };

        let resolved = sources
            .iter()
            .filter_map(|src| page_url.join(src).ok())
            .map(|url| url.to_string())
            .collect::<Vec<_>>();

        Ok(DownloadTarget::numbered(resolved))
    }

    async fn fetch_page(&self, page_url: &Url) -> Result<String> {
        let response = self
            .http
            .get(page_url.clone())
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::HttpStatus(format!("Page request failed: {}", e)))?;

        Ok(response.text().await?)
    }

    /// Retrieve one image as a byte stream.
    /// Returns (total_size, stream)
    pub async fn fetch_image_stream(
        &self,
        image_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(image_url)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::HttpStatus(format!("Image request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
