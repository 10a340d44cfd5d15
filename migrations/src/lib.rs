pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_catalog_tables;
mod m20240301_000002_create_locations_table;
mod m20240301_000003_create_inventories_table;
mod m20240301_000004_create_inventory_transactions_table;
mod m20240301_000005_create_auth_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_locations_table::Migration),
            Box::new(m20240301_000003_create_inventories_table::Migration),
            Box::new(m20240301_000004_create_inventory_transactions_table::Migration),
            Box::new(m20240301_000005_create_auth_tables::Migration),
        ]
    }
}
