//! autocrud: generated REST CRUD routes over pluggable storage, with per-route
//! dependency injection.
//!
//! ```ignore
//! let items = CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
//!     .depends(CrudRoute::Create, header_provider("user", USER_HEADER))
//!     .prefix("/items")
//!     .build()?;
//! ```

pub mod config;
pub mod deps;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod storage;

pub use config::{load_schema_file, parse_schema, resolve, FieldKind, ModelSchema, ModelShapes, ServerConfig};
pub use deps::{bearer_provider, header_provider, provider, DependencyProvider, Injected, RouteDependencies};
pub use error::{AppError, ConfigError};
pub use extractors::{RequestMeta, USER_HEADER};
pub use logging::init_tracing;
pub use model::{DynamicRecord, GenerateId, Resource};
pub use routes::{common_routes, crud_routes, CrudRoute, CrudRouter};
pub use service::CrudService;
pub use sql::TableMapping;
pub use state::CrudState;
pub use storage::{postgres::ensure_database_exists, MemoryStorage, PgStorage, StorageBackend};
