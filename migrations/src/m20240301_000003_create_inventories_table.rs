use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_catalog_tables::Items;
use crate::m20240301_000002_create_locations_table::Locations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inventories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inventories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inventories::ItemId).integer().not_null())
                    .col(ColumnDef::new(Inventories::LocationId).integer().not_null())
                    .col(
                        ColumnDef::new(Inventories::Quantity)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Inventories::Quantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Inventories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inventories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_item")
                            .from(Inventories::Table, Inventories::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_location")
                            .from(Inventories::Table, Inventories::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (item, location)
        manager
            .create_index(
                Index::create()
                    .name("uk_inventories_item_location")
                    .table(Inventories::Table)
                    .col(Inventories::ItemId)
                    .col(Inventories::LocationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventories_location_id")
                    .table(Inventories::Table)
                    .col(Inventories::LocationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inventories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Inventories {
    Table,
    Id,
    ItemId,
    LocationId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}
