use std::sync::Arc;
use std::time::Duration;
use log::{error, info, warn};
use reqwest::{redirect, Client, StatusCode, Url};
use scraper::{Html, Selector};
use thiserror::Error;

use crate::floof::FloofMajestyEvaluator;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("redirected to {0}")]
    Redirected(String),

    #[error("redirected without a location")]
    RedirectedWithoutLocation,

    #[error("unexpected status {0}")]
    StatusError(StatusCode),

    #[error("page loaded but no image URL was found")]
    NoImage,
}

/// Periodically loads the Odin of the day page and scores its cat picture.
pub struct OdinFetcher {
    client: Client,
    target_url: String,
    interval: Duration,
    evaluator: Arc<FloofMajestyEvaluator>,
}

impl OdinFetcher {
    pub fn new(
        target_url: String,
        interval_secs: u64,
        user_agent: &str,
        evaluator: Arc<FloofMajestyEvaluator>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            target_url,
            interval: Duration::from_secs(interval_secs.max(1)),
            evaluator,
        })
    }

    /// Fetches immediately, then once per interval, forever.
    pub async fn run(self) {
        info!(
            "Starting Odin fetcher, fetching {} every {} seconds",
            self.target_url,
            self.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    // One cycle; failures are logged and retried on the next tick
    async fn tick(&self) {
        let image_url = match self.fetch_image_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!("Error fetching {}: {}", self.target_url, e);
                return;
            }
        };

        match self.evaluator.score(&image_url).await {
            Ok(score) => info!("Floof Majesty Index for {}: {:.3}", image_url, score),
            Err(e) => error!("Error computing Floof Majesty Index for {}: {}", image_url, e),
        }
    }

    /// Loads the target page and resolves the first `<img>` on it.
    pub async fn fetch_image_url(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.target_url).send().await?;
        let status = response.status();
        let page_url = response.url().clone();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|h| h.to_str().ok())
                .map(|location| resolve_location(location, &page_url));
            return match location {
                Some(resolved) if !resolved.is_empty() => Err(FetchError::Redirected(resolved)),
                _ => Err(FetchError::RedirectedWithoutLocation),
            };
        }

        if !status.is_success() {
            return Err(FetchError::StatusError(status));
        }

        let body = response.text().await?;
        let image_url = extract_cat_image_url(&body, &page_url).ok_or(FetchError::NoImage)?;
        info!("Successfully fetched {} (status: {}, image: {})", self.target_url, status, image_url);

        Ok(image_url)
    }
}

fn resolve_location(location: &str, base: &Url) -> String {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    base.join(trimmed)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| trimmed.to_string())
}

/// First `<img src>` in the document, resolved against `base`.
pub fn extract_cat_image_url(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("img[src]").ok()?;

    let src = document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .next()?;

    if src.is_empty() {
        return None;
    }

    base.join(src).ok().map(|url| url.to_string())
}
