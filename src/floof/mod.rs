//! Floof Majesty: a heuristic for how photographically fur-textured an image is.
//!
//! An image is shrunk to a bounded working size, pixels are classified as
//! fur-coloured by brightness and saturation, and the local luma contrast
//! inside the fur region is measured. Flat cartoon fills can pass the colour
//! test, so texture coverage carries most of the weight.

pub mod evaluator;
pub mod metrics;
pub mod resize;

use thiserror::Error;

use crate::images::ImageFetchError;

pub use evaluator::{FloofMajestyEvaluator, FLOOF_ALGORITHM_VERSION};
pub use metrics::{calculate_floof_majesty, calculate_floof_metrics, FloofMetrics};
pub use resize::resize_for_floof;

#[derive(Error, Debug)]
pub enum FloofError {
    #[error("Floof evaluator not configured")]
    NotConfigured,

    #[error("Image URL cannot be empty")]
    EmptyUrl,

    #[error("Image fetch failed: {0}")]
    FetchError(#[from] ImageFetchError),

    #[error("Image decode failed: {0}")]
    DecodeError(#[from] image::ImageError),

    #[error("Failed to persist score: {0}")]
    PersistenceError(#[from] std::io::Error),

    #[error("Scoring task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}
