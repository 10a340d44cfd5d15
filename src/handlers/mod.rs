pub mod categories;
pub mod common;
pub mod health;
pub mod inventory;
pub mod items;
pub mod locations;
pub mod transactions;

use std::sync::Arc;

use crate::{
    db::DbPool,
    services::{
        AdjustmentService, CategoryService, InventoryQueryService, ItemService, LocationService,
        MovementService, TransactionService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub movement: Arc<MovementService>,
    pub adjustment: Arc<AdjustmentService>,
    pub inventory_query: Arc<InventoryQueryService>,
    pub transactions: Arc<TransactionService>,
    pub items: Arc<ItemService>,
    pub categories: Arc<CategoryService>,
    pub locations: Arc<LocationService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            movement: Arc::new(MovementService::new(db_pool.clone())),
            adjustment: Arc::new(AdjustmentService::new(db_pool.clone())),
            inventory_query: Arc::new(InventoryQueryService::new(db_pool.clone())),
            transactions: Arc::new(TransactionService::new(db_pool.clone())),
            items: Arc::new(ItemService::new(db_pool.clone())),
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            locations: Arc::new(LocationService::new(db_pool)),
        }
    }
}
