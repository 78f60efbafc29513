//! Load a model schema from a JSON file or string.

use crate::config::types::ModelSchema;
use crate::config::validate;
use crate::error::ConfigError;
use std::path::Path;

pub fn parse_schema(json: &str) -> Result<ModelSchema, ConfigError> {
    let schema: ModelSchema = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    validate(&schema)?;
    Ok(schema)
}

pub async fn load_schema_file(path: impl AsRef<Path>) -> Result<ModelSchema, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let schema = parse_schema(&raw)?;
    tracing::debug!(path = %path.display(), model = %schema.name, fields = schema.fields.len(), "loaded model schema");
    Ok(schema)
}
