//! Request body validation against a resolved input shape.

use crate::config::{InputShape, ShapeField, ShapeMode};
use crate::error::AppError;
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create or update body. Create requires every field; update
    /// checks only the fields that are present.
    pub fn validate(body: &Value, shape: &InputShape) -> Result<(), AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::Validation(format!("{} body must be a JSON object", shape.name)))?;
        for key in obj.keys() {
            if key == &shape.id_field {
                return Err(AppError::Validation(format!("{} is assigned by the server", key)));
            }
            if shape.field(key).is_none() {
                return Err(AppError::Validation(format!("unknown field '{}' for {}", key, shape.name)));
            }
        }
        for field in &shape.fields {
            match obj.get(&field.name) {
                None if shape.mode == ShapeMode::Create => {
                    return Err(AppError::Validation(format!("{} is required", field.name)));
                }
                None => {}
                Some(v) => validate_field(field, v)?,
            }
        }
        Ok(())
    }
}

fn validate_field(field: &ShapeField, v: &Value) -> Result<(), AppError> {
    let col = field.name.as_str();
    if v.is_null() {
        if field.nullable {
            return Ok(());
        }
        return Err(AppError::Validation(format!("{} must not be null", col)));
    }
    if !field.kind.accepts(v) {
        return Err(AppError::Validation(format!("{} must be a {}", col, field.kind.as_str())));
    }
    let rule = &field.rules;
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(re) = &field.pattern {
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(AppError::Validation(format!(
                "{} must be one of: {:?}",
                col,
                allowed.iter().take(5).collect::<Vec<_>>()
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_schema, resolve, ModelShapes};
    use serde_json::json;

    fn shapes() -> ModelShapes {
        let schema = parse_schema(
            r#"{"name":"Item","fields":[
                {"name":"id","type":"uuid"},
                {"name":"name","type":"string","rules":{"min_length":2,"max_length":5}},
                {"name":"qty","type":"integer","rules":{"minimum":0,"maximum":10}},
                {"name":"color","type":"string","nullable":true,"rules":{"allowed":["red","blue"]}},
                {"name":"sku","type":"string","nullable":true,"rules":{"pattern":"^[A-Z]{3}$"}}
            ]}"#,
        )
        .unwrap();
        resolve(&schema).unwrap()
    }

    fn err(body: Value, shape: &InputShape) -> String {
        RequestValidator::validate(&body, shape).unwrap_err().to_string()
    }

    #[test]
    fn create_requires_every_field() {
        let s = shapes();
        let ok = json!({ "name": "pen", "qty": 3, "color": null, "sku": "ABC" });
        assert!(RequestValidator::validate(&ok, &s.create).is_ok());
        assert_eq!(err(json!({ "name": "pen", "qty": 3, "color": null }), &s.create), "validation: sku is required");
    }

    #[test]
    fn update_accepts_any_subset() {
        let s = shapes();
        assert!(RequestValidator::validate(&json!({}), &s.update).is_ok());
        assert!(RequestValidator::validate(&json!({ "qty": 10 }), &s.update).is_ok());
        assert_eq!(err(json!({ "qty": 11 }), &s.update), "validation: qty must be at most 10");
    }

    #[test]
    fn rejects_id_unknown_and_wrong_kinds() {
        let s = shapes();
        assert!(err(json!({ "id": "x" }), &s.update).contains("assigned by the server"));
        assert!(err(json!({ "weight": 1 }), &s.update).contains("unknown field 'weight'"));
        assert_eq!(err(json!({ "qty": "3" }), &s.update), "validation: qty must be a integer");
        assert_eq!(err(json!({ "name": null }), &s.update), "validation: name must not be null");
        assert!(err(json!([1, 2]), &s.update).contains("ItemUpdate body must be a JSON object"));
    }

    #[test]
    fn applies_rules() {
        let s = shapes();
        assert!(err(json!({ "name": "p" }), &s.update).contains("at least 2"));
        assert!(err(json!({ "name": "pencil" }), &s.update).contains("at most 5"));
        assert!(err(json!({ "color": "green" }), &s.update).contains("must be one of"));
        assert!(err(json!({ "sku": "abc" }), &s.update).contains("pattern"));
        assert!(err(json!({ "qty": -1 }), &s.update).contains("at least 0"));
        assert!(RequestValidator::validate(&json!({ "color": "red", "sku": null }), &s.update).is_ok());
    }
}
