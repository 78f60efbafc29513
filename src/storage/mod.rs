//! Pluggable storage backends.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::deps::Injected;
use crate::error::AppError;
use crate::model::Resource;
use async_trait::async_trait;

/// The five CRUD operations. `injected` carries the route's resolved
/// dependencies; backends that need none may ignore it.
#[async_trait]
pub trait StorageBackend<M: Resource>: Send + Sync + 'static {
    async fn list(&self, injected: &Injected) -> Result<Vec<M>, AppError>;

    async fn create(&self, input: M::Create, injected: &Injected) -> Result<M, AppError>;

    async fn get(&self, id: &M::Id, injected: &Injected) -> Result<Option<M>, AppError>;

    /// Partial update. Fails with `NotFound` when `id` is not stored.
    async fn update(&self, id: &M::Id, input: M::Update, injected: &Injected) -> Result<M, AppError>;

    /// Removing an absent id is not an error.
    async fn delete(&self, id: &M::Id, injected: &Injected) -> Result<(), AppError>;
}
