//! Shared state for one generated resource router.

use crate::model::Resource;
use crate::service::CrudService;
use std::sync::Arc;

pub struct CrudState<M: Resource, S> {
    pub service: Arc<CrudService<M, S>>,
}

impl<M: Resource, S> Clone for CrudState<M, S> {
    fn clone(&self) -> Self {
        CrudState {
            service: self.service.clone(),
        }
    }
}
