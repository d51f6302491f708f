use std::sync::Arc;
use rocket::serde::json::Json;
use rocket::State;

use crate::api::ApiError;
use crate::floof::{FloofError, FloofMajestyEvaluator};
use crate::models::{FloofFavouriteResponse, FloofScoreResponse};

fn score_response(evaluator: &FloofMajestyEvaluator, url: String, score: f64) -> FloofScoreResponse {
    let algorithm_version = evaluator
        .store()
        .and_then(|store| store.get(&url))
        .map(|entry| entry.version)
        .unwrap_or_else(|| evaluator.algorithm_version());

    FloofScoreResponse { url, score, algorithm_version }
}

#[get("/top")]
pub fn get_top(
    evaluator: &State<Arc<FloofMajestyEvaluator>>,
) -> Result<Json<FloofFavouriteResponse>, ApiError> {
    let store = evaluator.store().ok_or(FloofError::NotConfigured)?;
    let (url, entry) = store.top_score().ok_or(ApiError::NoScores)?;

    Ok(Json(FloofFavouriteResponse {
        favourite: FloofScoreResponse {
            url,
            score: entry.score,
            algorithm_version: entry.version,
        },
        scored_images: store.len(),
    }))
}

#[get("/score?<url>")]
pub async fn get_score(
    url: Option<String>,
    evaluator: &State<Arc<FloofMajestyEvaluator>>,
) -> Result<Json<FloofScoreResponse>, ApiError> {
    let url = url.unwrap_or_default();
    let score = evaluator.score(&url).await?;
    Ok(Json(score_response(evaluator, url, score)))
}

#[post("/refresh?<url>")]
pub async fn refresh_score(
    url: Option<String>,
    evaluator: &State<Arc<FloofMajestyEvaluator>>,
) -> Result<Json<FloofScoreResponse>, ApiError> {
    let url = url.unwrap_or_default();
    log::info!("Forced Floof Majesty refresh for {}", url);
    let score = evaluator.force_refresh(&url).await?;
    Ok(Json(score_response(evaluator, url, score)))
}
