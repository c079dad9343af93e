// Prompt text for the crop recommendation call.

use crate::models::soil::SoilReading;

/// Recommendation prompt template.
/// Replace: {nitrogen}, {phosphorus}, {potassium}, {ph}, {temperature}, {humidity}, {rainfall}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"As an expert agronomist, recommend the best crops to plant based on the following soil and environmental data:
- Nitrogen (N): {nitrogen} mg/kg
- Phosphorus (P): {phosphorus} mg/kg
- Potassium (K): {potassium} mg/kg
- pH Level: {ph}
- Temperature: {temperature}°C
- Humidity: {humidity}%
- Rainfall: {rainfall} mm

Provide a list of the top 3 recommended crops. For each crop, include:
1. Crop Name
2. Confidence score (0-1)
3. Brief description
4. 3-4 specific growing tips
5. Optimal soil and climate conditions
6. Market value (Low, Medium, High)
7. A generic search term for a high-quality image of this crop.

Also provide a general piece of advice for the farmer based on these specific conditions."#;

/// Renders the recommendation prompt for a reading. Pure: same reading, same text.
pub fn build_prompt(reading: &SoilReading) -> String {
    reading
        .fields()
        .iter()
        .fold(
            RECOMMENDATION_PROMPT_TEMPLATE.to_string(),
            |prompt, (name, value)| prompt.replace(&format!("{{{name}}}"), &value.to_string()),
        )
}
