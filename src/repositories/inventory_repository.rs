use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, Page, PageRequest};
use crate::entities::{
    category,
    inventory::{self, Entity as Inventory},
    item, location,
};

/// Inventory status filters; all optional, combined with AND
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryStatusFilter {
    /// Substring of the item name
    pub name: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Substring of the item SKU
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub center_name: Option<String>,
    pub zone_code: Option<String>,
    pub bin_code: Option<String>,
    /// Minimum quantity of the individual inventory row
    pub min_quantity: Option<i32>,
}

/// One inventory row joined with its item, category and bin
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub item_id: i32,
    pub item_name: String,
    pub sku: Option<String>,
    pub price: i32,
    pub category_name: String,
    pub inventory_id: i32,
    pub quantity: i32,
    pub center_name: String,
    pub zone_code: String,
    pub bin_code: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<inventory::Model>, DbErr> {
        Inventory::find_by_id(id).one(conn).await
    }

    pub async fn find_by_item_and_location<C: ConnectionTrait>(
        conn: &C,
        item_id: i32,
        location_id: i32,
    ) -> Result<Option<inventory::Model>, DbErr> {
        Inventory::find()
            .filter(inventory::Column::ItemId.eq(item_id))
            .filter(inventory::Column::LocationId.eq(location_id))
            .one(conn)
            .await
    }

    /// Re-reads the given rows under `SELECT ... FOR UPDATE`, in ascending id order, so that two
    /// units of work touching the same pair of rows always lock them in the same order.
    pub async fn lock_for_update<C: ConnectionTrait>(
        conn: &C,
        ids: &[i32],
    ) -> Result<Vec<inventory::Model>, DbErr> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Inventory::find()
            .filter(inventory::Column::Id.is_in(ids))
            .order_by_asc(inventory::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await
    }

    /// Inserts an empty row for (item, location). A concurrent insert of the same pair fails on
    /// the unique index.
    pub async fn create_empty<C: ConnectionTrait>(
        conn: &C,
        item_id: i32,
        location_id: i32,
    ) -> Result<inventory::Model, DbErr> {
        let now = Utc::now();
        inventory::ActiveModel {
            item_id: Set(item_id),
            location_id: Set(location_id),
            quantity: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Writes `new_quantity` only if the row still holds `observed`. Returns false when another
    /// writer changed the row first.
    pub async fn compare_and_set_quantity<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        observed: i32,
        new_quantity: i32,
    ) -> Result<bool, DbErr> {
        let result = Inventory::update_many()
            .col_expr(inventory::Column::Quantity, Expr::value(new_quantity))
            .col_expr(inventory::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(inventory::Column::Id.eq(id))
            .filter(inventory::Column::Quantity.eq(observed))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Stock of an item summed over every bin
    pub async fn total_quantity_for_item<C: ConnectionTrait>(
        conn: &C,
        item_id: i32,
    ) -> Result<i64, DbErr> {
        let total = Inventory::find()
            .select_only()
            .column_as(
                Expr::col(inventory::Column::Quantity).sum(),
                "total_quantity",
            )
            .filter(inventory::Column::ItemId.eq(item_id))
            .into_tuple::<Option<i64>>()
            .one(conn)
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }

    pub async fn delete_by_item<C: ConnectionTrait>(conn: &C, item_id: i32) -> Result<u64, DbErr> {
        let result = Inventory::delete_many()
            .filter(inventory::Column::ItemId.eq(item_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn status<C: ConnectionTrait>(
        conn: &C,
        filter: &InventoryStatusFilter,
        request: PageRequest,
    ) -> Result<Page<InventorySummary>, DbErr> {
        let mut query = Inventory::find()
            .select_only()
            .column_as(item::Column::Id, "item_id")
            .column_as(item::Column::Name, "item_name")
            .column_as(item::Column::Sku, "sku")
            .column_as(item::Column::Price, "price")
            .column_as(category::Column::Name, "category_name")
            .column_as(inventory::Column::Id, "inventory_id")
            .column_as(inventory::Column::Quantity, "quantity")
            .column_as(location::Column::CenterName, "center_name")
            .column_as(location::Column::Zone, "zone_code")
            .column_as(location::Column::BinCode, "bin_code")
            .join(JoinType::InnerJoin, inventory::Relation::Item.def())
            .join(JoinType::InnerJoin, item::Relation::Category.def())
            .join(JoinType::InnerJoin, inventory::Relation::Location.def())
            .order_by_asc(item::Column::Id)
            .order_by_asc(inventory::Column::Id);

        if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(item::Column::Name.contains(name));
        }
        if let Some(sku) = filter.sku.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(item::Column::Sku.contains(sku));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(item::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(item::Column::Price.lte(max));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(item::Column::CategoryId.eq(category_id));
        }
        if let Some(center) = filter.center_name.as_deref() {
            query = query.filter(location::Column::CenterName.eq(center));
        }
        if let Some(zone) = filter.zone_code.as_deref() {
            query = query.filter(location::Column::Zone.eq(zone));
        }
        if let Some(bin) = filter.bin_code.as_deref() {
            query = query.filter(location::Column::BinCode.eq(bin));
        }
        if let Some(min_quantity) = filter.min_quantity {
            query = query.filter(inventory::Column::Quantity.gte(min_quantity));
        }

        fetch_page(conn, query.into_model::<InventorySummary>(), request).await
    }
}
