use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloofScoreResponse {
    pub url: String,
    pub score: f64,
    pub algorithm_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloofFavouriteResponse {
    pub favourite: FloofScoreResponse,
    pub scored_images: usize,
}
