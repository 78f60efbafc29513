//! Resource model: the output record plus its create and update input shapes.
//!
//! A resource only has to declare its three types. Construction from a create
//! input and partial updates go through `serde_json` by default, so the create
//! type is "output fields minus the id" and the update type is the same fields
//! wrapped in `Option`.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

/// Identifier of a stored item. Parsed from the `/{id}` path segment.
pub trait ResourceId:
    Clone + Eq + Hash + Display + FromStr + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> ResourceId for T where
    T: Clone + Eq + Hash + Display + FromStr + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Fresh identifiers for backends that assign ids themselves.
pub trait GenerateId {
    fn generate() -> Self;
}

impl GenerateId for uuid::Uuid {
    fn generate() -> Self {
        uuid::Uuid::new_v4()
    }
}

impl GenerateId for String {
    fn generate() -> Self {
        uuid::Uuid::new_v4().to_string()
    }
}

pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: ResourceId;
    /// Output fields minus the identifier, all required.
    type Create: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Output fields minus the identifier, all optional.
    type Update: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Name of the identifier field in the serialized record.
    const ID_FIELD: &'static str = "id";

    fn id(&self) -> Result<Self::Id, AppError> {
        let value = serde_json::to_value(self)?;
        let id = value
            .get(Self::ID_FIELD)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("record has no '{}' field", Self::ID_FIELD)))?;
        Ok(serde_json::from_value(id)?)
    }

    fn from_create(id: Self::Id, input: Self::Create) -> Result<Self, AppError> {
        let mut value = serde_json::to_value(input)?;
        let obj = value.as_object_mut().ok_or_else(|| {
            AppError::Internal(format!(
                "create input for {} must serialize to a JSON object",
                std::any::type_name::<Self>()
            ))
        })?;
        obj.insert(Self::ID_FIELD.to_string(), serde_json::to_value(id)?);
        Ok(serde_json::from_value(value)?)
    }

    /// Apply a partial update. Absent and `null` fields are left unchanged.
    fn apply_update(&self, input: Self::Update) -> Result<Self, AppError> {
        let mut current = serde_json::to_value(self)?;
        let patch = serde_json::to_value(input)?;
        merge_fields(&mut current, patch, Self::ID_FIELD, false)?;
        Ok(serde_json::from_value(current)?)
    }
}

/// Copy each key of `patch` onto `target`, never touching `id_field`.
/// With `keep_nulls` false, `null` in the patch means "not set".
pub fn merge_fields(target: &mut Value, patch: Value, id_field: &str, keep_nulls: bool) -> Result<(), AppError> {
    let target = target
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("stored record is not a JSON object".into()))?;
    let patch = match patch {
        Value::Object(m) => m,
        Value::Null => return Ok(()),
        _ => return Err(AppError::Validation("update body must be a JSON object".into())),
    };
    for (k, v) in patch {
        if k == id_field || (v.is_null() && !keep_nulls) {
            continue;
        }
        target.insert(k, v);
    }
    Ok(())
}

/// Patch object with unset fields removed: what a pass-through backend should write.
pub fn present_fields(patch: Value, id_field: &str) -> Result<Map<String, Value>, AppError> {
    match patch {
        Value::Object(m) => Ok(m.into_iter().filter(|(k, v)| k != id_field && !v.is_null()).collect()),
        Value::Null => Ok(Map::new()),
        _ => Err(AppError::Validation("update body must be a JSON object".into())),
    }
}

/// Schema-described record held as a JSON object. Shapes are enforced by the
/// router's model schema, so every key present in an update is applied,
/// including explicit `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord(pub Map<String, Value>);

impl DynamicRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl Resource for DynamicRecord {
    type Id = String;
    type Create = Map<String, Value>;
    type Update = Map<String, Value>;

    fn id(&self) -> Result<String, AppError> {
        match self.0.get(Self::ID_FIELD) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(AppError::Internal("record has no id".into())),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn apply_update(&self, input: Map<String, Value>) -> Result<Self, AppError> {
        let mut current = Value::Object(self.0.clone());
        merge_fields(&mut current, Value::Object(input), Self::ID_FIELD, true)?;
        match current {
            Value::Object(m) => Ok(DynamicRecord(m)),
            _ => Err(AppError::Internal("merged record is not a JSON object".into())),
        }
    }
}
