//! Route tables: generated CRUD routes and common health/version routes.

pub mod common;
pub mod crud;
pub mod operation;

pub use common::common_routes;
pub use crud::{crud_routes, CrudRouter};
pub use operation::CrudRoute;
