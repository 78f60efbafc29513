//! Resolved input shapes: create and update bodies derived from the output model.

use crate::config::types::{FieldKind, FieldRules, ModelSchema};
use crate::config::validate;
use crate::error::ConfigError;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeMode {
    /// Every field is required.
    Create,
    /// Every field is optional; only present fields are applied.
    Update,
}

#[derive(Clone, Debug)]
pub struct ShapeField {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub rules: FieldRules,
    /// Compiled from `rules.pattern` once at resolve time.
    pub pattern: Option<Regex>,
}

/// One input body shape (`<Model>Create` or `<Model>Update`).
#[derive(Clone, Debug)]
pub struct InputShape {
    pub name: String,
    pub mode: ShapeMode,
    pub id_field: String,
    pub fields: Vec<ShapeField>,
}

impl InputShape {
    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.mode == ShapeMode::Create && self.field(name).is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ModelShapes {
    pub name: String,
    pub id_field: String,
    pub create: InputShape,
    pub update: InputShape,
}

/// Build the create and update shapes for a model (call validates the schema first).
pub fn resolve(schema: &ModelSchema) -> Result<ModelShapes, ConfigError> {
    validate(schema)?;
    let mut fields = Vec::with_capacity(schema.fields.len());
    for f in schema.fields.iter().filter(|f| f.name != schema.id_field) {
        let pattern = match &f.rules.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| ConfigError::Schema(e.to_string()))?),
            None => None,
        };
        fields.push(ShapeField {
            name: f.name.clone(),
            kind: f.kind,
            nullable: f.nullable,
            rules: f.rules.clone(),
            pattern,
        });
    }
    let shape = |suffix: &str, mode| InputShape {
        name: format!("{}{}", schema.name, suffix),
        mode,
        id_field: schema.id_field.clone(),
        fields: fields.clone(),
    };
    Ok(ModelShapes {
        name: schema.name.clone(),
        id_field: schema.id_field.clone(),
        create: shape("Create", ShapeMode::Create),
        update: shape("Update", ShapeMode::Update),
    })
}
