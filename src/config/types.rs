//! Raw model schema types, matching the JSON schema file format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_id_field() -> String {
    "id".into()
}

/// Output model description: the canonical record shape returned to clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    /// Generated identifier field. Excluded from the create and update shapes.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub rules: FieldRules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Uuid,
    Json,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Uuid => "uuid",
            FieldKind::Json => "json",
        }
    }

    /// PostgreSQL cast used when binding values of this kind, if the default text binding is not enough.
    pub fn pg_type(&self) -> Option<&'static str> {
        match self {
            FieldKind::String => None,
            FieldKind::Integer => Some("int8"),
            FieldKind::Number => Some("float8"),
            FieldKind::Boolean => Some("bool"),
            FieldKind::Uuid => Some("uuid"),
            FieldKind::Json => Some("jsonb"),
        }
    }

    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            FieldKind::String => v.is_string(),
            FieldKind::Integer => v.is_i64() || v.is_u64(),
            FieldKind::Number => v.is_number(),
            FieldKind::Boolean => v.is_boolean(),
            FieldKind::Uuid => v.as_str().map(|s| uuid::Uuid::parse_str(s).is_ok()).unwrap_or(false),
            FieldKind::Json => true,
        }
    }
}

/// Optional per-field constraints, checked on create and update bodies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldRules {
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
}
