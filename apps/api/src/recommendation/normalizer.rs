//! Response Normalizer: turns the model's text payload into a `RecommendationResult`.
//!
//! Rules:
//! - empty payload, invalid JSON, or a shape mismatch → `MalformedResponse`
//! - `imageUrl` is always rewritten from the crop name; the model's hint is discarded
//! - every other field, and the order of recommendations, is kept as returned

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::recommendation::{
    CropRecommendation, MarketValue, OptimalConditions, RecommendationResult,
};
use crate::recommendation::RecommendationError;

const IMAGE_SERVICE_URL: &str = "https://picsum.photos/seed";
const IMAGE_WIDTH: u32 = 800;
const IMAGE_HEIGHT: u32 = 600;
const EXPECTED_CROP_COUNT: usize = 3;

/// Crop as the model returns it. Its `imageUrl` hint is not read at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCrop {
    crop_name: String,
    confidence: f64,
    description: String,
    growing_tips: Vec<String>,
    optimal_conditions: OptimalConditions,
    market_value: MarketValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    recommendations: Vec<RawCrop>,
    general_advice: String,
}

/// Lower-cases a crop name and replaces every run of whitespace with a single `-`.
/// Runs at either end are replaced too, not trimmed.
pub fn crop_slug(crop_name: &str) -> String {
    let mut slug = String::with_capacity(crop_name.len());
    let mut in_whitespace = false;
    for ch in crop_name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }
    slug
}

/// Deterministic placeholder image for a crop, derived only from its name.
pub fn placeholder_image_url(crop_name: &str) -> String {
    format!(
        "{IMAGE_SERVICE_URL}/{}/{IMAGE_WIDTH}/{IMAGE_HEIGHT}",
        crop_slug(crop_name)
    )
}

pub fn normalize_response(raw: &str) -> Result<RecommendationResult, RecommendationError> {
    let payload = strip_json_fences(raw);
    if payload.is_empty() {
        return Err(RecommendationError::MalformedResponse(
            "empty payload".to_string(),
        ));
    }

    let parsed: RawResult = serde_json::from_str(payload)
        .map_err(|e| RecommendationError::MalformedResponse(e.to_string()))?;

    let recommendations = parsed
        .recommendations
        .into_iter()
        .enumerate()
        .map(|(index, crop)| normalize_crop(index, crop))
        .collect::<Result<Vec<_>, _>>()?;

    if recommendations.len() != EXPECTED_CROP_COUNT {
        warn!(
            "Expected {EXPECTED_CROP_COUNT} recommendations, model returned {}",
            recommendations.len()
        );
    }

    Ok(RecommendationResult {
        recommendations,
        general_advice: parsed.general_advice,
    })
}

fn normalize_crop(index: usize, crop: RawCrop) -> Result<CropRecommendation, RecommendationError> {
    if crop.crop_name.trim().is_empty() {
        return Err(RecommendationError::MalformedResponse(format!(
            "recommendations[{index}].cropName is empty"
        )));
    }

    if !(0.0..=1.0).contains(&crop.confidence) {
        warn!(
            "Confidence {} for '{}' is outside [0, 1]",
            crop.confidence, crop.crop_name
        );
    }
    if !(3..=4).contains(&crop.growing_tips.len()) {
        warn!(
            "'{}' has {} growing tips, expected 3-4",
            crop.crop_name,
            crop.growing_tips.len()
        );
    }

    Ok(CropRecommendation {
        image_url: placeholder_image_url(&crop.crop_name),
        crop_name: crop.crop_name,
        confidence: crop.confidence,
        description: crop.description,
        growing_tips: crop.growing_tips,
        optimal_conditions: crop.optimal_conditions,
        market_value: crop.market_value,
    })
}
