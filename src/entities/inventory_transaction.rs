use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Kind of stock mutation recorded in the audit log.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[sea_orm(string_value = "INBOUND")]
    Inbound,

    #[sea_orm(string_value = "OUTBOUND")]
    Outbound,

    #[sea_orm(string_value = "MOVEMENT")]
    Movement,

    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Inbound => write!(f, "INBOUND"),
            TransactionType::Outbound => write!(f, "OUTBOUND"),
            TransactionType::Movement => write!(f, "MOVEMENT"),
            TransactionType::Adjustment => write!(f, "ADJUSTMENT"),
        }
    }
}

/// Immutable audit record. Rows are only ever inserted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub transaction_date: DateTime<Utc>,
    pub user_id: i32,
    pub notes: Option<String>,
}

/// Join metadata for history projections; the table itself carries no foreign keys, so audit
/// rows outlive the items, bins and users they mention.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::FromLocationId",
        to = "super::location::Column::Id"
    )]
    FromLocation,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::ToLocationId",
        to = "super::location::Column::Id"
    )]
    ToLocation,
    #[sea_orm(
        belongs_to = "crate::auth::user::Entity",
        from = "Column::UserId",
        to = "crate::auth::user::Column::Id"
    )]
    User,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
