use std::sync::Arc;

use crate::{
    db::DbPool,
    errors::ServiceError,
    repositories::{
        inventory_repository::{InventoryStatusFilter, InventorySummary},
        InventoryRepository, Page, PageRequest,
    },
};

/// Read side of the inventory: per-bin stock joined with catalog and location data
#[derive(Clone)]
pub struct InventoryQueryService {
    db: Arc<DbPool>,
}

impl InventoryQueryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn status(
        &self,
        filter: &InventoryStatusFilter,
        request: PageRequest,
    ) -> Result<Page<InventorySummary>, ServiceError> {
        Ok(InventoryRepository::status(self.db.as_ref(), filter, request).await?)
    }
}
