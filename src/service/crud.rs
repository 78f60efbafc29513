//! CrudService: runs one CRUD operation with the route's dependencies resolved first.

use crate::config::{InputShape, ModelShapes};
use crate::deps::{self, Injected, RouteDependencies};
use crate::error::AppError;
use crate::extractors::RequestMeta;
use crate::model::Resource;
use crate::routes::CrudRoute;
use crate::service::RequestValidator;
use crate::storage::StorageBackend;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

pub struct CrudService<M: Resource, S> {
    storage: Arc<S>,
    dependencies: RouteDependencies,
    shapes: Option<ModelShapes>,
    _model: PhantomData<fn() -> M>,
}

impl<M, S> CrudService<M, S>
where
    M: Resource,
    S: StorageBackend<M>,
{
    pub fn new(storage: Arc<S>, dependencies: RouteDependencies) -> Self {
        CrudService {
            storage,
            dependencies,
            shapes: None,
            _model: PhantomData,
        }
    }

    /// Validate request bodies against schema-derived shapes before deserializing.
    pub fn with_shapes(mut self, shapes: ModelShapes) -> Self {
        self.shapes = Some(shapes);
        self
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn dependencies(&self) -> &RouteDependencies {
        &self.dependencies
    }

    async fn inject(&self, route: CrudRoute, meta: &RequestMeta) -> Result<Injected, AppError> {
        let providers = self.dependencies.for_route(route);
        if providers.is_empty() {
            return Ok(Injected::new());
        }
        deps::resolve(providers, meta).await.map_err(|e| {
            tracing::warn!(route = %route, error = %e, "dependency resolution failed");
            e
        })
    }

    pub async fn list(&self, meta: &RequestMeta) -> Result<Vec<M>, AppError> {
        let injected = self.inject(CrudRoute::List, meta).await?;
        let items = self.storage.list(&injected).await?;
        tracing::debug!(resource = type_name::<M>(), count = items.len(), "list");
        Ok(items)
    }

    pub async fn create(&self, body: Value, meta: &RequestMeta) -> Result<M, AppError> {
        let input: M::Create = parse_body(body, self.shapes.as_ref().map(|s| &s.create))?;
        let injected = self.inject(CrudRoute::Create, meta).await?;
        let item = self.storage.create(input, &injected).await?;
        if let Ok(id) = item.id() {
            tracing::info!(resource = type_name::<M>(), id = %id, "created");
        }
        Ok(item)
    }

    pub async fn get(&self, raw_id: &str, meta: &RequestMeta) -> Result<M, AppError> {
        let id = parse_id::<M::Id>(raw_id)?;
        let injected = self.inject(CrudRoute::Get, meta).await?;
        let item = self.storage.get(&id, &injected).await?;
        tracing::debug!(resource = type_name::<M>(), id = %id, found = item.is_some(), "get");
        item.ok_or_else(|| AppError::NotFound(raw_id.to_string()))
    }

    pub async fn update(&self, raw_id: &str, body: Value, meta: &RequestMeta) -> Result<M, AppError> {
        let id = parse_id::<M::Id>(raw_id)?;
        let input: M::Update = parse_body(body, self.shapes.as_ref().map(|s| &s.update))?;
        let injected = self.inject(CrudRoute::Update, meta).await?;
        let item = self.storage.update(&id, input, &injected).await?;
        tracing::debug!(resource = type_name::<M>(), id = %id, "updated");
        Ok(item)
    }

    pub async fn delete(&self, raw_id: &str, meta: &RequestMeta) -> Result<(), AppError> {
        let id = parse_id::<M::Id>(raw_id)?;
        let injected = self.inject(CrudRoute::Delete, meta).await?;
        self.storage.delete(&id, &injected).await?;
        tracing::info!(resource = type_name::<M>(), id = %id, "deleted");
        Ok(())
    }
}

fn parse_id<I: FromStr>(raw: &str) -> Result<I, AppError> {
    raw.parse().map_err(|_| AppError::BadRequest(format!("invalid id: {}", raw)))
}

fn parse_body<T: DeserializeOwned>(body: Value, shape: Option<&InputShape>) -> Result<T, AppError> {
    if let Some(shape) = shape {
        RequestValidator::validate(&body, shape)?;
    }
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_schema, resolve};
    use crate::deps::{header_provider, provider};
    use crate::model::DynamicRecord;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn service(deps: RouteDependencies) -> CrudService<DynamicRecord, MemoryStorage<DynamicRecord>> {
        CrudService::new(Arc::new(MemoryStorage::new()), deps)
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let svc = service(RouteDependencies::new());
        let meta = RequestMeta::default();
        let created = svc.create(json!({ "title": "a", "n": 1 }), &meta).await.unwrap();
        let id = created.id().unwrap();

        assert_eq!(svc.get(&id, &meta).await.unwrap(), created);
        let updated = svc.update(&id, json!({ "n": 2 }), &meta).await.unwrap();
        assert_eq!(updated.get("title"), Some(&json!("a")));
        assert_eq!(updated.get("n"), Some(&json!(2)));
        assert_eq!(svc.list(&meta).await.unwrap().len(), 1);

        svc.delete(&id, &meta).await.unwrap();
        assert!(matches!(svc.get(&id, &meta).await.unwrap_err(), AppError::NotFound(_)));
        assert!(svc.list(&meta).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn body_must_fit_input_type() {
        let svc = service(RouteDependencies::new());
        let err = svc.create(json!("text"), &RequestMeta::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn shapes_are_checked_before_storage() {
        let schema = parse_schema(r#"{"name":"Note","fields":[{"name":"body","type":"string"}]}"#).unwrap();
        let svc = service(RouteDependencies::new()).with_shapes(resolve(&schema).unwrap());
        let meta = RequestMeta::default();
        assert!(svc.create(json!({}), &meta).await.is_err());
        assert!(svc.storage().is_empty().await);
        assert!(svc.create(json!({ "body": "hi" }), &meta).await.is_ok());
    }

    #[tokio::test]
    async fn failing_dependency_skips_storage_call() {
        let deps = RouteDependencies::new().route(CrudRoute::Create, header_provider("user", "x-user"));
        let svc = service(deps);
        let err = svc.create(json!({ "a": 1 }), &RequestMeta::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(svc.storage().is_empty().await);
        // Other routes carry no dependency.
        assert!(svc.list(&RequestMeta::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dependency_errors_pass_through_unchanged() {
        let deps = RouteDependencies::new().route(
            CrudRoute::Delete,
            provider("admin", |_meta| async { Err::<(), _>(AppError::Forbidden("admins only".into())) }),
        );
        let svc = service(deps);
        let err = svc.delete("any", &RequestMeta::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "forbidden: admins only");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_is_logged() {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let svc = service(RouteDependencies::new());
        let meta = RequestMeta::default();
        let created = svc.create(json!({ "title": "a" }), &meta).await.unwrap();
        let id = created.id().unwrap();
        svc.get(&id, &meta).await.unwrap();
        assert!(svc.get("missing", &meta).await.is_err());

        let logs = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let gets: Vec<&str> = logs.lines().filter(|l| l.contains(": get ")).collect();
        assert_eq!(gets.len(), 2, "{}", logs);
        assert!(gets[0].contains(&id) && gets[0].contains("found=true"));
        assert!(gets[1].contains("found=false"));
    }

    #[test]
    fn invalid_ids_are_bad_requests() {
        assert!(matches!(parse_id::<uuid::Uuid>("nope"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_id::<i64>("12").unwrap(), 12);
    }
}
