//! Response schema handed to Gemini alongside the prompt.
//!
//! Uses the OpenAPI subset Gemini accepts for `responseSchema` (upper-case type names).
//! It only constrains generation; the normalizer still validates what comes back.

use serde_json::{json, Value};

use crate::models::recommendation::MarketValue;

pub fn response_schema() -> Value {
    let market_values: Vec<&str> = MarketValue::ALL.iter().map(|v| v.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "cropName": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" },
                        "description": { "type": "STRING" },
                        "growingTips": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "optimalConditions": {
                            "type": "OBJECT",
                            "properties": {
                                "soil": { "type": "STRING" },
                                "climate": { "type": "STRING" }
                            },
                            "required": ["soil", "climate"]
                        },
                        "marketValue": { "type": "STRING", "enum": market_values },
                        "imageUrl": {
                            "type": "STRING",
                            "description": "A keyword for the crop image"
                        }
                    },
                    "required": [
                        "cropName",
                        "confidence",
                        "description",
                        "growingTips",
                        "optimalConditions",
                        "marketValue",
                        "imageUrl"
                    ]
                }
            },
            "generalAdvice": { "type": "STRING" }
        },
        "required": ["recommendations", "generalAdvice"]
    })
}
