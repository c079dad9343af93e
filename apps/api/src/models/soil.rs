use serde::{Deserialize, Serialize};

/// The seven field measurements collected by the soil analysis form.
///
/// No agronomic bounds are enforced. Negative temperatures and out-of-range pH
/// values are forwarded to the model as entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    /// mg/kg
    pub nitrogen: f64,
    /// mg/kg
    pub phosphorus: f64,
    /// mg/kg
    pub potassium: f64,
    pub ph: f64,
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// mm
    pub rainfall: f64,
}

impl Default for SoilReading {
    fn default() -> Self {
        Self {
            nitrogen: 40.0,
            phosphorus: 40.0,
            potassium: 40.0,
            ph: 6.5,
            temperature: 25.0,
            humidity: 60.0,
            rainfall: 100.0,
        }
    }
}

impl SoilReading {
    /// Field names paired with their values, in form order.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("nitrogen", self.nitrogen),
            ("phosphorus", self.phosphorus),
            ("potassium", self.potassium),
            ("ph", self.ph),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("rainfall", self.rainfall),
        ]
    }

    /// Returns the name of every field holding NaN or an infinity.
    pub fn non_finite_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Display metadata for one form control. Informational only, never enforced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldHint {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

fn hint(
    name: &'static str,
    label: &'static str,
    unit: &'static str,
    min: f64,
    max: f64,
    step: f64,
) -> FieldHint {
    FieldHint {
        name,
        label,
        unit,
        min,
        max,
        step,
    }
}

/// Hints for the seven form controls, nutrients first then environment.
/// Controls without explicit bounds use the form's 0..=1000, step 1 defaults.
pub fn field_hints() -> Vec<FieldHint> {
    vec![
        hint("nitrogen", "Nitrogen (N)", "mg/kg", 0.0, 1000.0, 1.0),
        hint("phosphorus", "Phosphorus (P)", "mg/kg", 0.0, 1000.0, 1.0),
        hint("potassium", "Potassium (K)", "mg/kg", 0.0, 1000.0, 1.0),
        hint("ph", "Soil pH", "pH", 0.0, 14.0, 0.1),
        hint("temperature", "Temperature", "°C", -10.0, 60.0, 1.0),
        hint("humidity", "Humidity", "%", 0.0, 100.0, 1.0),
        hint("rainfall", "Rainfall", "mm", 0.0, 1000.0, 1.0),
    ]
}
