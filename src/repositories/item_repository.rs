use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    JoinType, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, Page, PageRequest};
use crate::entities::{
    category,
    inventory,
    item::{self, Entity as Item},
};

/// Item search filters; every field is optional and they combine with AND
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ItemSearchFilter {
    /// Substring of the item name
    pub name: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Substring of the SKU
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    /// Minimum total quantity across all bins
    pub min_quantity: Option<i64>,
}

/// Item row with its category name and stock summed over all bins
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub price: i32,
    pub safety_stock: i32,
    pub category_name: String,
    pub total_quantity: i64,
}

fn total_quantity_expr() -> SimpleExpr {
    Func::coalesce([
        Expr::col((inventory::Entity, inventory::Column::Quantity)).sum(),
        Expr::val(0).into(),
    ])
    .into()
}

/// Data access for items
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemRepository;

impl ItemRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<item::Model>, DbErr> {
        Item::find_by_id(id).one(conn).await
    }

    /// Item together with its category
    pub async fn find_with_category<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<(item::Model, Option<category::Model>)>, DbErr> {
        Item::find_by_id(id)
            .find_also_related(category::Entity)
            .one(conn)
            .await
    }

    pub async fn find_by_sku<C: ConnectionTrait>(
        conn: &C,
        sku: &str,
    ) -> Result<Option<item::Model>, DbErr> {
        Item::find()
            .filter(item::Column::Sku.eq(sku))
            .one(conn)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: item::ActiveModel,
    ) -> Result<item::Model, DbErr> {
        model.insert(conn).await
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        model: item::ActiveModel,
    ) -> Result<item::Model, DbErr> {
        model.update(conn).await
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, model: item::Model) -> Result<(), DbErr> {
        model.delete(conn).await.map(|_| ())
    }

    pub async fn search<C: ConnectionTrait>(
        conn: &C,
        filter: &ItemSearchFilter,
        request: PageRequest,
    ) -> Result<Page<ItemSummary>, DbErr> {
        let mut query = Item::find()
            .select_only()
            .column(item::Column::Id)
            .column(item::Column::Name)
            .column(item::Column::Sku)
            .column(item::Column::Price)
            .column(item::Column::SafetyStock)
            .column_as(category::Column::Name, "category_name")
            .column_as(total_quantity_expr(), "total_quantity")
            .join(JoinType::InnerJoin, item::Relation::Category.def())
            .join(JoinType::LeftJoin, item::Relation::Inventories.def())
            .group_by(item::Column::Id)
            .group_by(item::Column::Name)
            .group_by(item::Column::Sku)
            .group_by(item::Column::Price)
            .group_by(item::Column::SafetyStock)
            .group_by(category::Column::Name)
            .order_by_asc(item::Column::Id);

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
        if let Some(min_quantity) = filter.min_quantity {
            query = query.having(Expr::expr(total_quantity_expr()).gte(min_quantity));
        }

        fetch_page(conn, query.into_model::<ItemSummary>(), request).await
    }
}
