// Stock mutations
pub mod adjustment;
pub mod ledger;
pub mod movement;

// Catalog and locations
pub mod categories;
pub mod items;
pub mod locations;

// Read models
pub mod inventory_query;
pub mod transactions;

#[cfg(test)]
mod fixtures;

pub use adjustment::AdjustmentService;
pub use categories::CategoryService;
pub use inventory_query::InventoryQueryService;
pub use items::ItemService;
pub use locations::LocationService;
pub use movement::MovementService;
pub use transactions::TransactionService;
