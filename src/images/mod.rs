use std::time::Duration;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Image request failed with status: {0}")]
    StatusError(StatusCode),
}

/// Formats the scorer can decode, so content-negotiating hosts don't send WebP or AVIF.
pub const ACCEPT_DECODABLE_IMAGES: &str = "image/png,image/jpeg,image/gif;q=0.9,*/*;q=0.5";

/// Downloads raw image bytes over HTTP with a fixed timeout.
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout: u64, user_agent: &str) -> Result<Self, ImageFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    // Fetch an image from a URL
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
        let response = self.client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_DECODABLE_IMAGES)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Image request for {} failed with status: {}", url, status);
            return Err(ImageFetchError::StatusError(status));
        }

        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes from {}", bytes.len(), url);

        Ok(bytes.to_vec())
    }
}
