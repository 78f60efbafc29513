//! Schema validation: names, uniqueness, rule consistency.

use crate::config::types::ModelSchema;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

pub fn validate(schema: &ModelSchema) -> Result<(), ConfigError> {
    if schema.name.trim().is_empty() {
        return Err(ConfigError::Schema("model name must not be empty".into()));
    }
    if schema.id_field.trim().is_empty() {
        return Err(ConfigError::Schema(format!("{}: id_field must not be empty", schema.name)));
    }
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(ConfigError::Schema(format!("{}: field with empty name", schema.name)));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Schema(format!(
                "{}: duplicate field '{}'",
                schema.name, field.name
            )));
        }
        let rules = &field.rules;
        if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
            if min > max {
                return Err(ConfigError::Schema(format!(
                    "{}.{}: min_length {} exceeds max_length {}",
                    schema.name, field.name, min, max
                )));
            }
        }
        if let (Some(min), Some(max)) = (rules.minimum, rules.maximum) {
            if min > max {
                return Err(ConfigError::Schema(format!(
                    "{}.{}: minimum {} exceeds maximum {}",
                    schema.name, field.name, min, max
                )));
            }
        }
        if let Some(pattern) = &rules.pattern {
            Regex::new(pattern).map_err(|e| {
                ConfigError::Schema(format!("{}.{}: invalid pattern: {}", schema.name, field.name, e))
            })?;
        }
    }
    Ok(())
}
