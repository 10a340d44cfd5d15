use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, Page, PageRequest};
use crate::entities::{
    inventory, item,
    location::{self, Entity as Location},
};

/// Exact-match location filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LocationSearchFilter {
    pub center_name: Option<String>,
    pub zone: Option<String>,
    pub is_active: Option<bool>,
}

/// One item stocked in a bin
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemInLocation {
    pub item_id: i32,
    pub item_name: String,
    pub item_sku: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocationRepository;

impl LocationRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<location::Model>, DbErr> {
        Location::find_by_id(id).one(conn).await
    }

    pub async fn find_by_bin_code<C: ConnectionTrait>(
        conn: &C,
        bin_code: &str,
    ) -> Result<Option<location::Model>, DbErr> {
        Location::find()
            .filter(location::Column::BinCode.eq(bin_code))
            .one(conn)
            .await
    }

    /// True when another location (not `exclude_id`) has the same (center, zone, bin) triple
    pub async fn triple_taken<C: ConnectionTrait>(
        conn: &C,
        center_name: &str,
        zone: &str,
        bin_code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = Location::find().filter(
            Condition::all()
                .add(location::Column::CenterName.eq(center_name))
                .add(location::Column::Zone.eq(zone))
                .add(location::Column::BinCode.eq(bin_code)),
        );
        if let Some(id) = exclude_id {
            query = query.filter(location::Column::Id.ne(id));
        }
        Ok(query.count(conn).await? > 0)
    }

    /// True when another location (not `exclude_id`) already uses `bin_code`
    pub async fn bin_code_taken<C: ConnectionTrait>(
        conn: &C,
        bin_code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = Location::find().filter(location::Column::BinCode.eq(bin_code));
        if let Some(id) = exclude_id {
            query = query.filter(location::Column::Id.ne(id));
        }
        Ok(query.count(conn).await? > 0)
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: location::ActiveModel,
    ) -> Result<location::Model, DbErr> {
        model.insert(conn).await
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        model: location::ActiveModel,
    ) -> Result<location::Model, DbErr> {
        model.update(conn).await
    }

    pub async fn search<C: ConnectionTrait>(
        conn: &C,
        filter: &LocationSearchFilter,
        request: PageRequest,
    ) -> Result<Page<location::Model>, DbErr> {
        let mut query = Location::find().order_by_asc(location::Column::Id);
        if let Some(center) = filter.center_name.as_deref() {
            query = query.filter(location::Column::CenterName.eq(center));
        }
        if let Some(zone) = filter.zone.as_deref() {
            query = query.filter(location::Column::Zone.eq(zone));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(location::Column::IsActive.eq(active));
        }
        fetch_page(conn, query, request).await
    }

    pub async fn center_names<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, DbErr> {
        Location::find()
            .select_only()
            .column(location::Column::CenterName)
            .distinct()
            .order_by_asc(location::Column::CenterName)
            .into_tuple::<String>()
            .all(conn)
            .await
    }

    pub async fn zones_by_center<C: ConnectionTrait>(
        conn: &C,
        center_name: &str,
    ) -> Result<Vec<String>, DbErr> {
        Location::find()
            .select_only()
            .column(location::Column::Zone)
            .distinct()
            .filter(location::Column::CenterName.eq(center_name))
            .order_by_asc(location::Column::Zone)
            .into_tuple::<String>()
            .all(conn)
            .await
    }

    /// Items stocked in a bin, zero rows included, ordered by item id
    pub async fn items_in_location<C: ConnectionTrait>(
        conn: &C,
        location_id: i32,
    ) -> Result<Vec<ItemInLocation>, DbErr> {
        inventory::Entity::find()
            .select_only()
            .column_as(item::Column::Id, "item_id")
            .column_as(item::Column::Name, "item_name")
            .column_as(item::Column::Sku, "item_sku")
            .column(inventory::Column::Quantity)
            .join(JoinType::InnerJoin, inventory::Relation::Item.def())
            .filter(inventory::Column::LocationId.eq(location_id))
            .order_by_asc(item::Column::Id)
            .into_model::<ItemInLocation>()
            .all(conn)
            .await
    }
}
