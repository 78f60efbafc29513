//! Resolved dependency values for one request, keyed by provider name.

use crate::error::AppError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

pub type DependencyValue = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct Injected {
    values: HashMap<String, DependencyValue>,
}

impl Injected {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    pub(crate) fn insert_boxed(&mut self, name: String, value: DependencyValue) {
        self.values.insert(name, value);
    }

    /// Value injected under `name`, if present and of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref::<T>()
    }

    pub fn require<T: Any>(&self, name: &str) -> Result<&T, AppError> {
        self.get(name).ok_or_else(|| {
            AppError::Internal(format!(
                "dependency '{}' missing or not a {}",
                name,
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Injected").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup_by_name() {
        let mut injected = Injected::new();
        injected.insert("user", String::from("alice"));
        injected.insert("tenant_id", 7_u64);

        assert_eq!(injected.get::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(injected.get::<u64>("tenant_id"), Some(&7));
        assert!(injected.get::<u32>("tenant_id").is_none());
        assert!(injected.get::<String>("missing").is_none());
        assert!(injected.require::<u32>("tenant_id").is_err());
        assert_eq!(injected.len(), 2);
        assert_eq!(format!("{:?}", injected), r#"Injected { names: ["tenant_id", "user"] }"#);
    }
}
