//! The five generated CRUD routes, addressable by name.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrudRoute {
    /// `GET /`
    List,
    /// `POST /`
    Create,
    /// `GET /{id}`
    Get,
    /// `PUT /{id}`
    Update,
    /// `DELETE /{id}`
    Delete,
}

impl CrudRoute {
    pub const ALL: [CrudRoute; 5] = [
        CrudRoute::List,
        CrudRoute::Create,
        CrudRoute::Get,
        CrudRoute::Update,
        CrudRoute::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CrudRoute::List => "list",
            CrudRoute::Create => "create",
            CrudRoute::Get => "get",
            CrudRoute::Update => "update",
            CrudRoute::Delete => "delete",
        }
    }

    /// Routes mounted on `/{id}` rather than the collection path.
    pub fn is_item_route(&self) -> bool {
        matches!(self, CrudRoute::Get | CrudRoute::Update | CrudRoute::Delete)
    }
}

impl fmt::Display for CrudRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrudRoute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" => Ok(CrudRoute::List),
            "create" => Ok(CrudRoute::Create),
            "get" | "read" => Ok(CrudRoute::Get),
            "update" => Ok(CrudRoute::Update),
            "delete" => Ok(CrudRoute::Delete),
            _ => Err(ConfigError::Validation(format!(
                "unknown route: {} (expected list, create, get, update or delete)",
                s
            ))),
        }
    }
}
