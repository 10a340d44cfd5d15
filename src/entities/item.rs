use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// `category.code` followed by the item id; assigned right after the first insert.
    #[sea_orm(unique)]
    pub sku: Option<String>,
    pub price: i32,
    pub safety_stock: i32,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventories,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds the SKU for an item in a category.
pub fn generate_sku(category_code: &str, item_id: i32) -> String {
    format!("{}{}", category_code, item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_is_category_code_followed_by_id() {
        assert_eq!(generate_sku("ELEC", 42), "ELEC42");
        assert_eq!(generate_sku("", 7), "7");
    }
}
