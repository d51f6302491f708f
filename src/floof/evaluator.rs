use std::sync::Arc;
use log::{debug, info};

use crate::cache::FloofMajestyStore;
use crate::floof::{calculate_floof_metrics, resize_for_floof, FloofError};
use crate::images::ImageFetcher;

/// Generation of the scoring formula. Cached scores from older generations
/// are recomputed, so bumping this invalidates the whole cache.
///
/// 1: fur area and average texture only.
/// 2: adds texture coverage as the dominant signal.
pub const FLOOF_ALGORITHM_VERSION: u32 = 2;

pub struct FloofMajestyEvaluator {
    store: Option<Arc<FloofMajestyStore>>,
    fetcher: ImageFetcher,
    version: u32,
}

impl FloofMajestyEvaluator {
    pub fn new(store: Option<Arc<FloofMajestyStore>>, fetcher: ImageFetcher) -> Self {
        Self {
            store,
            fetcher,
            version: FLOOF_ALGORITHM_VERSION,
        }
    }

    /// Overrides the algorithm version scores are stamped with.
    pub fn with_algorithm_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn algorithm_version(&self) -> u32 {
        self.version
    }

    pub fn store(&self) -> Option<&Arc<FloofMajestyStore>> {
        self.store.as_ref()
    }

    /// Returns the cached score for `image_url` when it was computed by the
    /// current algorithm version, otherwise downloads and scores the image.
    pub async fn score(&self, image_url: &str) -> Result<f64, FloofError> {
        let store = self.check_request(image_url)?;

        if let Some(entry) = store.get(image_url) {
            if entry.version >= self.version {
                debug!("Using cached Floof Majesty score for {}", image_url);
                return Ok(entry.score);
            }
            info!(
                "Cached score for {} is from version {}, rescoring with version {}",
                image_url, entry.version, self.version
            );
        }

        self.compute_and_store(store, image_url).await
    }

    /// Scores `image_url` from a fresh download, ignoring any cached value.
    pub async fn force_refresh(&self, image_url: &str) -> Result<f64, FloofError> {
        let store = self.check_request(image_url)?;
        self.compute_and_store(store, image_url).await
    }

    fn check_request(&self, image_url: &str) -> Result<&Arc<FloofMajestyStore>, FloofError> {
        let store = self.store.as_ref().ok_or(FloofError::NotConfigured)?;
        if image_url.is_empty() {
            return Err(FloofError::EmptyUrl);
        }
        Ok(store)
    }

    async fn compute_and_store(&self, store: &Arc<FloofMajestyStore>, image_url: &str) -> Result<f64, FloofError> {
        let data = self.fetcher.fetch_image(image_url).await?;

        // Decoding, the pixel passes and the cache flush all block
        let store = Arc::clone(store);
        let image_url = image_url.to_string();
        let version = self.version;
        tokio::task::spawn_blocking(move || score_and_store(&store, &image_url, &data, version)).await?
    }
}

fn score_and_store(
    store: &FloofMajestyStore,
    image_url: &str,
    data: &[u8],
    version: u32,
) -> Result<f64, FloofError> {
    let img = image::load_from_memory(data)?;

    let normalized = resize_for_floof(&img);
    let metrics = calculate_floof_metrics(&normalized);
    let score = metrics.majesty();
    debug!("Floof metrics for {}: {:?}", image_url, metrics);

    store.set(image_url, score, version)?;
    Ok(score)
}
