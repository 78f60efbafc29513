//! Dependency providers: named async callables resolved per request.

use crate::deps::injected::DependencyValue;
use crate::error::AppError;
use crate::extractors::RequestMeta;
use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

#[async_trait]
pub trait DependencyProvider: Send + Sync {
    /// Name the resolved value is injected under.
    fn name(&self) -> &str;

    async fn resolve(&self, meta: &RequestMeta) -> Result<DependencyValue, AppError>;
}

struct FnProvider<F, T> {
    name: String,
    f: F,
    _value: PhantomData<fn() -> T>,
}

#[async_trait]
impl<F, Fut, T> DependencyProvider for FnProvider<F, T>
where
    F: Fn(RequestMeta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Any + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, meta: &RequestMeta) -> Result<DependencyValue, AppError> {
        let value = (self.f)(meta.clone()).await?;
        let boxed: DependencyValue = Box::new(value);
        Ok(boxed)
    }
}

/// Provider from an async closure. The closure may ignore the request metadata.
pub fn provider<F, Fut, T>(name: impl Into<String>, f: F) -> Arc<dyn DependencyProvider>
where
    F: Fn(RequestMeta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Any + Send + Sync,
{
    Arc::new(FnProvider {
        name: name.into(),
        f,
        _value: PhantomData,
    })
}

/// Requires a non-empty `header`; injects its trimmed value as a `String`.
pub fn header_provider(name: impl Into<String>, header: &'static str) -> Arc<dyn DependencyProvider> {
    provider(name, move |meta: RequestMeta| async move {
        meta.header(header)
            .ok_or_else(|| AppError::Unauthorized(format!("{} header is required", header)))
    })
}

/// Requires `Authorization: Bearer <token>`; injects the token as a `String`.
pub fn bearer_provider(name: impl Into<String>) -> Arc<dyn DependencyProvider> {
    provider(name, |meta: RequestMeta| async move {
        meta.bearer_token()
            .ok_or_else(|| AppError::Unauthorized("bearer token is required".into()))
    })
}
