use serde::{Deserialize, Serialize};
use sea_orm::{ConnectionTrait, DbErr, SqlErr};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::ledger::{self, TransactionRecord};
use crate::{
    db::{
        transaction::{with_retrying_transaction, DEFAULT_MAX_ATTEMPTS},
        DbPool,
    },
    entities::{
        inventory,
        inventory_transaction::{self, TransactionType},
    },
    errors::ServiceError,
    repositories::{InventoryRepository, ItemRepository, LocationRepository},
};

/// Request to move stock of one item between two bins
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveInventoryRequest {
    pub item_id: i32,
    #[validate(length(max = 30))]
    pub from_bin_code: String,
    #[validate(length(max = 30))]
    pub to_bin_code: String,
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl MoveInventoryRequest {
    pub fn new(
        item_id: i32,
        from_bin_code: impl Into<String>,
        to_bin_code: impl Into<String>,
        quantity: i32,
        notes: Option<String>,
    ) -> Self {
        Self {
            item_id,
            from_bin_code: from_bin_code.into(),
            to_bin_code: to_bin_code.into(),
            quantity,
            notes,
        }
    }
}

/// Moves stock between bins as one unit of work
#[derive(Clone)]
pub struct MovementService {
    db: Arc<DbPool>,
}

impl MovementService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Moves `request.quantity` units and returns the MOVEMENT audit row.
    ///
    /// Checks run in a fixed order and the first failure wins: positive quantity, distinct bins,
    /// item, both bins, source row, then sufficient stock. A lost write race re-runs everything
    /// from fresh data.
    #[instrument(skip(self, request), fields(item_id = request.item_id, quantity = request.quantity))]
    pub async fn move_stock(
        &self,
        request: MoveInventoryRequest,
        user_id: i32,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::InvalidMovement(
                "quantity must be positive".to_string(),
            ));
        }
        if request.from_bin_code == request.to_bin_code {
            return Err(ServiceError::InvalidMovement(
                "source and destination must differ".to_string(),
            ));
        }
        request.validate()?;

        let transaction = with_retrying_transaction(&self.db, DEFAULT_MAX_ATTEMPTS, |txn| {
            let request = request.clone();
            Box::pin(async move { apply_movement(txn, request, user_id).await })
        })
        .await?;

        info!(
            transaction_id = transaction.id,
            from = ?transaction.from_location_id,
            to = ?transaction.to_location_id,
            "inventory moved"
        );
        Ok(transaction)
    }
}

async fn apply_movement<C: ConnectionTrait>(
    conn: &C,
    request: MoveInventoryRequest,
    user_id: i32,
) -> Result<inventory_transaction::Model, ServiceError> {
    let item = ItemRepository::find_by_id(conn, request.item_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("item", request.item_id))?;

    let from = LocationRepository::find_by_bin_code(conn, &request.from_bin_code)
        .await?
        .ok_or_else(|| ServiceError::not_found("location", &request.from_bin_code))?;
    let to = LocationRepository::find_by_bin_code(conn, &request.to_bin_code)
        .await?
        .ok_or_else(|| ServiceError::not_found("location", &request.to_bin_code))?;

    let source = InventoryRepository::find_by_item_and_location(conn, item.id, from.id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "inventory for item {} in bin {} not found",
                item.id, from.bin_code
            ))
        })?;

    let destination = destination_row(conn, item.id, to.id).await?;
    let (source, destination) = lock_pair(conn, source.id, destination.id).await?;

    let source_quantity = ledger::decrease(&source, request.quantity).map_err(|err| match err {
        ServiceError::InsufficientStock(_) => ServiceError::InsufficientStock(format!(
            "bin {} holds {}, requested {}",
            from.bin_code, source.quantity, request.quantity
        )),
        other => other,
    })?;
    let destination_quantity = ledger::increase(&destination, request.quantity)?;

    ledger::store_quantity(conn, &source, source_quantity).await?;
    ledger::store_quantity(conn, &destination, destination_quantity).await?;

    ledger::record_transaction(
        conn,
        TransactionRecord::new(
            item.id,
            Some(from.id),
            Some(to.id),
            TransactionType::Movement,
            request.quantity,
            user_id,
            request.notes,
        ),
    )
    .await
}

/// Locks both rows lowest id first and returns their current state as `(source, destination)`.
async fn lock_pair<C: ConnectionTrait>(
    conn: &C,
    source_id: i32,
    destination_id: i32,
) -> Result<(inventory::Model, inventory::Model), ServiceError> {
    let locked = InventoryRepository::lock_for_update(conn, &[source_id, destination_id]).await?;
    let row = |id: i32| {
        locked.iter().find(|row| row.id == id).cloned().ok_or_else(|| {
            ServiceError::ConcurrentModification(format!("inventory {} was removed", id))
        })
    };
    Ok((row(source_id)?, row(destination_id)?))
}

/// Existing (item, location) row, or a new one at zero.
async fn destination_row<C: ConnectionTrait>(
    conn: &C,
    item_id: i32,
    location_id: i32,
) -> Result<inventory::Model, ServiceError> {
    if let Some(existing) =
        InventoryRepository::find_by_item_and_location(conn, item_id, location_id).await?
    {
        return Ok(existing);
    }
    InventoryRepository::create_empty(conn, item_id, location_id)
        .await
        .map_err(|err| racing_insert(err, item_id, location_id))
}

fn racing_insert(err: DbErr, item_id: i32, location_id: i32) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::ConcurrentModification(
            format!(
                "inventory for item {} in location {} was created concurrently",
                item_id, location_id
            ),
        ),
        _ => ServiceError::DatabaseError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn duplicate_destination_insert_is_a_lost_race() {
        let db = fixtures::memory_db().await;
        let item = fixtures::item(&db).await;
        let bin = fixtures::bin(&db, "B-02-01").await;
        fixtures::stock(&db, item.id, bin.id, 0).await;

        let err = InventoryRepository::create_empty(&db, item.id, bin.id)
            .await
            .unwrap_err();
        assert_matches!(
            racing_insert(err, item.id, bin.id),
            ServiceError::ConcurrentModification(_)
        );
    }

    #[tokio::test]
    async fn lock_pair_keeps_roles_when_source_has_the_higher_id() {
        let db = fixtures::memory_db().await;
        let item = fixtures::item(&db).await;
        let low_bin = fixtures::bin(&db, "C-01-01").await;
        let high_bin = fixtures::bin(&db, "C-01-02").await;
        let low = fixtures::stock(&db, item.id, low_bin.id, 3).await;
        let high = fixtures::stock(&db, item.id, high_bin.id, 30).await;

        let (source, destination) = lock_pair(&db, high.id, low.id).await.unwrap();
        assert_eq!((source.id, source.quantity), (high.id, 30));
        assert_eq!((destination.id, destination.quantity), (low.id, 3));
    }

    #[tokio::test]
    async fn lock_pair_reports_a_vanished_row_as_a_lost_race() {
        let db = fixtures::memory_db().await;
        let item = fixtures::item(&db).await;
        let bin = fixtures::bin(&db, "C-02-01").await;
        let row = fixtures::stock(&db, item.id, bin.id, 3).await;

        assert_matches!(
            lock_pair(&db, row.id, row.id + 1000).await,
            Err(ServiceError::ConcurrentModification(_))
        );
    }
}
