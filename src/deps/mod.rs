//! Per-route dependency injection.
//!
//! Each generated route may carry a list of providers. Before the storage call
//! the route's providers are resolved concurrently and joined; the first error
//! aborts the request unchanged. Values reach the storage backend through
//! [`Injected`], keyed by provider name.

pub mod injected;
pub mod provider;

pub use injected::{DependencyValue, Injected};
pub use provider::{bearer_provider, header_provider, provider, DependencyProvider};

use crate::error::{AppError, ConfigError};
use crate::extractors::RequestMeta;
use crate::routes::CrudRoute;
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct RouteDependencies {
    by_route: HashMap<CrudRoute, Vec<Arc<dyn DependencyProvider>>>,
}

impl RouteDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: CrudRoute, provider: Arc<dyn DependencyProvider>) -> Self {
        self.by_route.entry(route).or_default().push(provider);
        self
    }

    /// Attach one provider to every route.
    pub fn all(mut self, provider: Arc<dyn DependencyProvider>) -> Self {
        for route in CrudRoute::ALL {
            self.by_route.entry(route).or_default().push(provider.clone());
        }
        self
    }

    pub fn for_route(&self, route: CrudRoute) -> &[Arc<dyn DependencyProvider>] {
        self.by_route.get(&route).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merge(mut self, other: RouteDependencies) -> Self {
        for (route, providers) in other.by_route {
            self.by_route.entry(route).or_default().extend(providers);
        }
        self
    }

    /// Names must be unique per route; values are keyed by name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for route in CrudRoute::ALL {
            let mut seen = HashSet::new();
            for p in self.for_route(route) {
                if !seen.insert(p.name()) {
                    return Err(ConfigError::DuplicateDependency {
                        route: route.to_string(),
                        name: p.name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RouteDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for route in CrudRoute::ALL {
            let names: Vec<&str> = self.for_route(route).iter().map(|p| p.name()).collect();
            if !names.is_empty() {
                map.entry(&route.as_str(), &names);
            }
        }
        map.finish()
    }
}

/// Resolve all providers concurrently. No ordering is guaranteed between them.
pub async fn resolve(providers: &[Arc<dyn DependencyProvider>], meta: &RequestMeta) -> Result<Injected, AppError> {
    let pending = providers.iter().map(|p| async move {
        let value = p.resolve(meta).await?;
        Ok::<_, AppError>((p.name().to_string(), value))
    });
    let resolved = try_join_all(pending).await?;
    let mut injected = Injected::new();
    for (name, value) in resolved {
        injected.insert_boxed(name, value);
    }
    Ok(injected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    #[test]
    fn duplicate_names_on_one_route_are_rejected() {
        let deps = RouteDependencies::new()
            .route(CrudRoute::Create, header_provider("user", "x-user"))
            .route(CrudRoute::Create, bearer_provider("user"));
        let err = deps.validate().unwrap_err();
        assert_eq!(err.to_string(), "duplicate dependency 'user' on route create");
    }

    #[test]
    fn same_name_on_different_routes_is_fine() {
        let deps = RouteDependencies::new()
            .route(CrudRoute::Create, header_provider("user", "x-user"))
            .route(CrudRoute::Delete, header_provider("user", "x-user"));
        assert!(deps.validate().is_ok());
        assert_eq!(deps.for_route(CrudRoute::Create).len(), 1);
        assert!(deps.for_route(CrudRoute::List).is_empty());
    }

    #[test]
    fn all_and_merge_attach_to_every_route() {
        let deps = RouteDependencies::new()
            .all(provider("db", |_m| async { Ok::<_, AppError>(()) }))
            .merge(RouteDependencies::new().route(CrudRoute::Get, bearer_provider("token")));
        for route in CrudRoute::ALL {
            assert_eq!(deps.for_route(route)[0].name(), "db");
        }
        assert_eq!(deps.for_route(CrudRoute::Get).len(), 2);
        assert_eq!(format!("{:?}", deps).matches("db").count(), 5);
    }

    #[tokio::test]
    async fn providers_run_concurrently() {
        // Both providers wait on the same barrier: a sequential join would never finish.
        let barrier = Arc::new(Barrier::new(2));
        let make = |name: &'static str, barrier: Arc<Barrier>| {
            provider(name, move |_meta| {
                let barrier = barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok::<_, AppError>(name.len())
                }
            })
        };
        let providers = vec![make("first", barrier.clone()), make("second_one", barrier)];
        let injected = tokio::time::timeout(Duration::from_secs(2), resolve(&providers, &RequestMeta::default()))
            .await
            .expect("providers should not wait on each other")
            .unwrap();
        assert_eq!(injected.get::<usize>("first"), Some(&5));
        assert_eq!(injected.get::<usize>("second_one"), Some(&10));
    }

    #[tokio::test]
    async fn first_error_aborts_resolution() {
        // The slow provider never finishes on its own; the error must not wait for it.
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (s, f) = (started.clone(), finished.clone());
        let providers = vec![
            provider("slow", move |_meta| {
                let (s, f) = (s.clone(), f.clone());
                async move {
                    s.fetch_add(1, Ordering::SeqCst);
                    std::future::pending::<()>().await;
                    f.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, AppError>(1_u8)
                }
            }),
            header_provider("user", "x-user"),
        ];
        let err = tokio::time::timeout(Duration::from_secs(2), resolve(&providers, &RequestMeta::default()))
            .await
            .expect("error should not wait for pending providers")
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_providers_resolves_empty() {
        let injected = resolve(&[], &RequestMeta::default()).await.unwrap();
        assert!(injected.is_empty());
    }
}
