//! CrudService: dependency resolution, body validation, and the storage call.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::RequestValidator;
