use flock_core::{ConfigError, SimulationConfig};
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unknown preset '{0}', expected 'sea' or 'classic'")]
    UnknownPreset(String),
    #[error("config overrides must be a JSON object")]
    NotAnObject,
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl From<SetupError> for JsValue {
    fn from(err: SetupError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Builds a config from an optional preset name and optional JSON overrides.
///
/// Overrides use the camelCase field names, e.g. `{"count": 60, "speedLimit": 0.8}`;
/// fields left out keep the preset's value.
pub fn resolve_config(
    preset: Option<&str>,
    overrides: Option<&str>,
) -> Result<SimulationConfig, SetupError> {
    let base = match preset {
        Some(name) => SimulationConfig::preset(name)
            .ok_or_else(|| SetupError::UnknownPreset(name.to_string()))?,
        None => SimulationConfig::default(),
    };

    let config = match overrides.map(str::trim).filter(|json| !json.is_empty()) {
        Some(json) => {
            let mut merged = serde_json::to_value(base)?;
            let patch: Value = serde_json::from_str(json)?;
            match (&mut merged, patch) {
                (Value::Object(fields), Value::Object(patch)) => fields.extend(patch),
                _ => return Err(SetupError::NotAnObject),
            }
            serde_json::from_value(merged)?
        }
        None => base,
    };

    config.validate()?;
    Ok(config)
}
