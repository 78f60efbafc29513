//! Route table generator: five CRUD routes for one resource.
//!
//! `GET /` and `POST /` are mounted on the collection path; `GET`, `PUT` and
//! `DELETE` on `/:id`. Operations can be switched off individually.

use crate::config::{resolve, ModelSchema};
use crate::deps::{DependencyProvider, RouteDependencies};
use crate::error::ConfigError;
use crate::handlers::crud::{create, delete, list, read, update};
use crate::model::Resource;
use crate::routes::CrudRoute;
use crate::service::CrudService;
use crate::state::CrudState;
use crate::storage::StorageBackend;
use axum::routing::MethodRouter;
use axum::Router;
use std::marker::PhantomData;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

pub struct CrudRouter<M: Resource, S> {
    storage: Arc<S>,
    dependencies: RouteDependencies,
    operations: Vec<CrudRoute>,
    schema: Option<ModelSchema>,
    body_limit: Option<usize>,
    prefix: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M, S> CrudRouter<M, S>
where
    M: Resource,
    S: StorageBackend<M>,
{
    pub fn new(storage: impl Into<Arc<S>>) -> Self {
        CrudRouter {
            storage: storage.into(),
            dependencies: RouteDependencies::new(),
            operations: CrudRoute::ALL.to_vec(),
            schema: None,
            body_limit: None,
            prefix: None,
            _model: PhantomData,
        }
    }

    pub fn dependencies(mut self, dependencies: RouteDependencies) -> Self {
        self.dependencies = self.dependencies.merge(dependencies);
        self
    }

    pub fn depends(mut self, route: CrudRoute, provider: Arc<dyn DependencyProvider>) -> Self {
        self.dependencies = self.dependencies.route(route, provider);
        self
    }

    /// Mount only these operations.
    pub fn operations(mut self, operations: &[CrudRoute]) -> Self {
        self.operations = operations.to_vec();
        self
    }

    /// Validate create and update bodies against shapes derived from this schema.
    pub fn schema(mut self, schema: ModelSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = Some(bytes);
        self
    }

    /// Nest the routes under `prefix` (e.g. "/items"). It must start with '/';
    /// an empty prefix mounts at the root.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<Router, ConfigError> {
        self.dependencies.validate()?;
        if self.operations.is_empty() {
            return Err(ConfigError::Validation("no operations enabled".into()));
        }
        let prefix = match self.prefix.as_deref() {
            None | Some("") => None,
            Some("/") => return Err(ConfigError::Validation("prefix must not be '/'".into())),
            Some(p) if !p.starts_with('/') => {
                return Err(ConfigError::Validation(format!("prefix '{}' must start with '/'", p)));
            }
            Some(p) => Some(p.to_string()),
        };
        let mut service = CrudService::new(self.storage, self.dependencies);
        if let Some(schema) = &self.schema {
            if schema.id_field != M::ID_FIELD {
                return Err(ConfigError::Schema(format!(
                    "{}: id field '{}' does not match the resource id field '{}'",
                    schema.name,
                    schema.id_field,
                    M::ID_FIELD
                )));
            }
            service = service.with_shapes(resolve(schema)?);
        }
        tracing::debug!(
            resource = std::any::type_name::<M>(),
            operations = ?self.operations,
            dependencies = ?service.dependencies(),
            "building crud router"
        );
        let state = CrudState {
            service: Arc::new(service),
        };

        let enabled = |route: CrudRoute| self.operations.contains(&route);
        let mut collection: MethodRouter<CrudState<M, S>> = MethodRouter::new();
        let mut item: MethodRouter<CrudState<M, S>> = MethodRouter::new();
        if enabled(CrudRoute::List) {
            collection = collection.get(list::<M, S>);
        }
        if enabled(CrudRoute::Create) {
            collection = collection.post(create::<M, S>);
        }
        if enabled(CrudRoute::Get) {
            item = item.get(read::<M, S>);
        }
        if enabled(CrudRoute::Update) {
            item = item.put(update::<M, S>);
        }
        if enabled(CrudRoute::Delete) {
            item = item.delete(delete::<M, S>);
        }

        let mut router = Router::new();
        if enabled(CrudRoute::List) || enabled(CrudRoute::Create) {
            router = router.route("/", collection);
        }
        if self.operations.iter().any(CrudRoute::is_item_route) {
            router = router.route("/:id", item);
        }
        let mut router: Router = router.with_state(state);
        if let Some(limit) = self.body_limit {
            router = router.layer(RequestBodyLimitLayer::new(limit));
        }
        Ok(match prefix {
            Some(prefix) => Router::new().nest(&prefix, router),
            None => router,
        })
    }
}

/// All five routes over `storage`, with per-route dependencies.
pub fn crud_routes<M, S>(storage: impl Into<Arc<S>>, dependencies: RouteDependencies) -> Result<Router, ConfigError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    CrudRouter::<M, S>::new(storage).dependencies(dependencies).build()
}
