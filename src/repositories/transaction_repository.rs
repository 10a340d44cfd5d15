use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Alias, Expr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, Page, PageRequest};
use crate::{
    auth::user,
    entities::{
        inventory_transaction::{self, Entity as InventoryTransaction, TransactionType},
        item, location,
    },
};

const FROM_LOCATION: &str = "from_loc";
const TO_LOCATION: &str = "to_loc";

/// History filters; date bounds are inclusive
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionHistoryFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub item_id: Option<i32>,
    pub item_sku: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub username: Option<String>,
    pub from_bin_code: Option<String>,
    pub to_bin_code: Option<String>,
}

/// Audit row with item, bins and user resolved. Joined columns are null when the referenced row
/// no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub transaction_id: i32,
    pub item_id: i32,
    pub item_name: Option<String>,
    pub item_sku: Option<String>,
    pub from_bin_code: Option<String>,
    pub from_center_name: Option<String>,
    pub to_bin_code: Option<String>,
    pub to_center_name: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub transaction_date: DateTime<Utc>,
    pub user_id: i32,
    pub username: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionRepository;

impl TransactionRepository {
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: inventory_transaction::ActiveModel,
    ) -> Result<inventory_transaction::Model, DbErr> {
        model.insert(conn).await
    }

    pub async fn history<C: ConnectionTrait>(
        conn: &C,
        filter: &TransactionHistoryFilter,
        request: PageRequest,
    ) -> Result<Page<TransactionHistory>, DbErr> {
        let from_loc = Alias::new(FROM_LOCATION);
        let to_loc = Alias::new(TO_LOCATION);

        let mut query = InventoryTransaction::find()
            .select_only()
            .column_as(inventory_transaction::Column::Id, "transaction_id")
            .column(inventory_transaction::Column::ItemId)
            .column_as(item::Column::Name, "item_name")
            .column_as(item::Column::Sku, "item_sku")
            .column_as(
                Expr::col((from_loc.clone(), location::Column::BinCode)),
                "from_bin_code",
            )
            .column_as(
                Expr::col((from_loc.clone(), location::Column::CenterName)),
                "from_center_name",
            )
            .column_as(
                Expr::col((to_loc.clone(), location::Column::BinCode)),
                "to_bin_code",
            )
            .column_as(
                Expr::col((to_loc.clone(), location::Column::CenterName)),
                "to_center_name",
            )
            .column(inventory_transaction::Column::TransactionType)
            .column(inventory_transaction::Column::Quantity)
            .column(inventory_transaction::Column::TransactionDate)
            .column(inventory_transaction::Column::UserId)
            .column_as(user::Column::Username, "username")
            .column(inventory_transaction::Column::Notes)
            .join(JoinType::LeftJoin, inventory_transaction::Relation::Item.def())
            .join_as(
                JoinType::LeftJoin,
                inventory_transaction::Relation::FromLocation.def(),
                from_loc.clone(),
            )
            .join_as(
                JoinType::LeftJoin,
                inventory_transaction::Relation::ToLocation.def(),
                to_loc.clone(),
            )
            .join(JoinType::LeftJoin, inventory_transaction::Relation::User.def())
            .order_by_desc(inventory_transaction::Column::TransactionDate)
            .order_by_desc(inventory_transaction::Column::Id);

        if let Some(kind) = filter.transaction_type {
            query = query.filter(inventory_transaction::Column::TransactionType.eq(kind));
        }
        if let Some(item_id) = filter.item_id {
            query = query.filter(inventory_transaction::Column::ItemId.eq(item_id));
        }
        if let Some(sku) = filter.item_sku.as_deref() {
            query = query.filter(item::Column::Sku.eq(sku));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(inventory_transaction::Column::TransactionDate.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(inventory_transaction::Column::TransactionDate.lte(end));
        }
        if let Some(username) = filter.username.as_deref() {
            query = query.filter(user::Column::Username.eq(username));
        }
        if let Some(bin) = filter.from_bin_code.as_deref() {
            query = query.filter(Expr::col((from_loc, location::Column::BinCode)).eq(bin));
        }
        if let Some(bin) = filter.to_bin_code.as_deref() {
            query = query.filter(Expr::col((to_loc, location::Column::BinCode)).eq(bin));
        }

        fetch_page(conn, query.into_model::<TransactionHistory>(), request).await
    }
}
