//! In-memory backend: items map plus insertion order, behind an async lock.

use crate::deps::Injected;
use crate::error::AppError;
use crate::model::{GenerateId, Resource};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

struct Items<M: Resource> {
    by_id: HashMap<M::Id, M>,
    order: Vec<M::Id>,
}

pub struct MemoryStorage<M: Resource> {
    items: RwLock<Items<M>>,
}

impl<M: Resource> MemoryStorage<M> {
    pub fn new() -> Self {
        MemoryStorage {
            items: RwLock::new(Items {
                by_id: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Seed with existing records. Ids must be unique.
    pub fn with_items(items: Vec<M>) -> Result<Self, AppError> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut order = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id()?;
            if by_id.contains_key(&id) {
                return Err(AppError::Conflict(format!("duplicate id {}", id)));
            }
            order.push(id.clone());
            by_id.insert(id, item);
        }
        Ok(MemoryStorage {
            items: RwLock::new(Items { by_id, order }),
        })
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<M: Resource> Default for MemoryStorage<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M> StorageBackend<M> for MemoryStorage<M>
where
    M: Resource,
    M::Id: GenerateId,
{
    async fn list(&self, _injected: &Injected) -> Result<Vec<M>, AppError> {
        let items = self.items.read().await;
        Ok(items.order.iter().filter_map(|id| items.by_id.get(id)).cloned().collect())
    }

    async fn create(&self, input: M::Create, _injected: &Injected) -> Result<M, AppError> {
        let id = M::Id::generate();
        let item = M::from_create(id.clone(), input)?;
        let mut items = self.items.write().await;
        if items.by_id.contains_key(&id) {
            return Err(AppError::Conflict(format!("duplicate id {}", id)));
        }
        items.order.push(id.clone());
        items.by_id.insert(id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: &M::Id, _injected: &Injected) -> Result<Option<M>, AppError> {
        Ok(self.items.read().await.by_id.get(id).cloned())
    }

    async fn update(&self, id: &M::Id, input: M::Update, _injected: &Injected) -> Result<M, AppError> {
        let mut items = self.items.write().await;
        let existing = items
            .by_id
            .get(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let updated = existing.apply_update(input)?;
        items.by_id.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &M::Id, _injected: &Injected) -> Result<(), AppError> {
        let mut items = self.items.write().await;
        if items.by_id.remove(id).is_some() {
            items.order.retain(|k| k != id);
        }
        Ok(())
    }
}
