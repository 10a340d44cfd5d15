use chrono::Utc;
use sea_orm::{ActiveValue::Set, ConnectionTrait, IntoActiveModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::{transaction::with_transaction, DbPool},
    entities::{
        category,
        item::{self, generate_sku},
    },
    errors::ServiceError,
    repositories::{
        item_repository::{ItemSearchFilter, ItemSummary},
        CategoryRepository, InventoryRepository, ItemRepository, Page, PageRequest,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[validate(range(min = 0))]
    pub safety_stock: i32,
    pub category_id: i32,
}

impl ItemRequest {
    pub fn new(name: impl Into<String>, price: i32, safety_stock: i32, category_id: i32) -> Self {
        Self {
            name: name.into(),
            price,
            safety_stock,
            category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub safety_stock: i32,
    pub price: i32,
    pub category_id: i32,
    pub category_name: String,
}

impl ItemResponse {
    fn new(item: item::Model, category: &category::Model) -> Self {
        Self {
            id: item.id,
            name: item.name,
            sku: item.sku,
            safety_stock: item.safety_stock,
            price: item.price,
            category_id: item.category_id,
            category_name: category.name.clone(),
        }
    }
}

/// Item catalog
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DbPool>,
}

impl ItemService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Inserts the item and assigns its SKU in the same unit of work.
    #[instrument(skip(self, request), fields(category_id = request.category_id))]
    pub async fn register(&self, request: ItemRequest) -> Result<ItemResponse, ServiceError> {
        request.validate()?;

        let response = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let category = find_category(txn, request.category_id).await?;
                let now = Utc::now();
                let inserted = ItemRepository::insert(
                    txn,
                    item::ActiveModel {
                        name: Set(request.name),
                        sku: Set(None),
                        price: Set(request.price),
                        safety_stock: Set(request.safety_stock),
                        category_id: Set(category.id),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    },
                )
                .await?;

                let saved = assign_sku(txn, inserted, &category).await?;
                Ok(ItemResponse::new(saved, &category))
            })
        })
        .await?;

        info!(item_id = response.id, sku = ?response.sku, "item registered");
        Ok(response)
    }

    pub async fn get(&self, id: i32) -> Result<ItemResponse, ServiceError> {
        match ItemRepository::find_with_category(self.db.as_ref(), id).await? {
            Some((item, Some(category))) => Ok(ItemResponse::new(item, &category)),
            Some((item, None)) => Err(ServiceError::not_found("category", item.category_id)),
            None => Err(ServiceError::not_found("item", id)),
        }
    }

    /// Updates the item; the SKU is regenerated only when the category changes.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i32, request: ItemRequest) -> Result<ItemResponse, ServiceError> {
        request.validate()?;

        with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = ItemRepository::find_by_id(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("item", id))?;
                let category = find_category(txn, request.category_id).await?;
                let category_changed = existing.category_id != category.id;

                let mut active = existing.into_active_model();
                active.name = Set(request.name);
                active.price = Set(request.price);
                active.safety_stock = Set(request.safety_stock);
                active.category_id = Set(category.id);
                active.updated_at = Set(Utc::now());
                let updated = ItemRepository::update(txn, active).await?;

                let saved = if category_changed {
                    assign_sku(txn, updated, &category).await?
                } else {
                    updated
                };
                Ok(ItemResponse::new(saved, &category))
            })
        })
        .await
    }

    /// Deletes an item that holds no stock, together with its empty inventory rows. Audit rows
    /// keep the item id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = ItemRepository::find_by_id(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("item", id))?;

                let total = InventoryRepository::total_quantity_for_item(txn, id).await?;
                if total > 0 {
                    return Err(ServiceError::InvalidArgument(
                        "cannot delete item with remaining stock".to_string(),
                    ));
                }

                InventoryRepository::delete_by_item(txn, id).await?;
                ItemRepository::delete(txn, existing).await?;
                Ok(())
            })
        })
        .await?;

        info!(item_id = id, "item deleted");
        Ok(())
    }

    pub async fn search(
        &self,
        filter: &ItemSearchFilter,
        request: PageRequest,
    ) -> Result<Page<ItemSummary>, ServiceError> {
        Ok(ItemRepository::search(self.db.as_ref(), filter, request).await?)
    }
}

async fn find_category<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<category::Model, ServiceError> {
    CategoryRepository::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("category", id))
}

/// Sets SKU = category code + item id, failing with `Conflict` if another item already has it.
async fn assign_sku<C: ConnectionTrait>(
    conn: &C,
    item: item::Model,
    category: &category::Model,
) -> Result<item::Model, ServiceError> {
    let sku = generate_sku(&category.code, item.id);
    if let Some(other) = ItemRepository::find_by_sku(conn, &sku).await? {
        if other.id != item.id {
            return Err(ServiceError::Conflict(format!("SKU {} already in use", sku)));
        }
    }

    let mut active = item.into_active_model();
    active.sku = Set(Some(sku.clone()));
    ItemRepository::update(conn, active)
        .await
        .map_err(|err| ServiceError::from_write_err(err, format!("SKU {} already in use", sku)))
}
