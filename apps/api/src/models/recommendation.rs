use serde::{Deserialize, Serialize};

/// Market value category. The schema sent to the model restricts it to these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketValue {
    Low,
    Medium,
    High,
}

impl MarketValue {
    pub const ALL: [MarketValue; 3] = [MarketValue::Low, MarketValue::Medium, MarketValue::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketValue::Low => "Low",
            MarketValue::Medium => "Medium",
            MarketValue::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalConditions {
    pub soil: String,
    pub climate: String,
}

/// One crop suggestion as rendered on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub crop_name: String,
    /// Expected in [0, 1]; not enforced.
    pub confidence: f64,
    pub description: String,
    pub growing_tips: Vec<String>,
    pub optimal_conditions: OptimalConditions,
    pub market_value: MarketValue,
    /// Always derived from `crop_name`, never taken from the model.
    pub image_url: String,
}

/// The full answer to one submission. Replaces any previous result wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub recommendations: Vec<CropRecommendation>,
    pub general_advice: String,
}
