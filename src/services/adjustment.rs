use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
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
    entities::inventory_transaction::{self, TransactionType},
    errors::ServiceError,
    repositories::InventoryRepository,
};

/// Signed correction of a single inventory row, e.g. after a recount
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustInventoryRequest {
    pub inventory_id: i32,
    /// Positive adds stock, negative removes it, zero records a recount
    pub adjustment_quantity: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl AdjustInventoryRequest {
    pub fn new(inventory_id: i32, adjustment_quantity: i32, notes: Option<String>) -> Self {
        Self {
            inventory_id,
            adjustment_quantity,
            notes,
        }
    }
}

#[derive(Clone)]
pub struct AdjustmentService {
    db: Arc<DbPool>,
}

impl AdjustmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Applies the delta and returns the ADJUSTMENT audit row.
    #[instrument(skip(self, request), fields(inventory_id = request.inventory_id, delta = request.adjustment_quantity))]
    pub async fn adjust(
        &self,
        request: AdjustInventoryRequest,
        user_id: i32,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        request.validate()?;

        let transaction = with_retrying_transaction(&self.db, DEFAULT_MAX_ATTEMPTS, |txn| {
            let request = request.clone();
            Box::pin(async move { apply_adjustment(txn, request, user_id).await })
        })
        .await?;

        info!(transaction_id = transaction.id, "inventory adjusted");
        Ok(transaction)
    }
}

async fn apply_adjustment<C: ConnectionTrait>(
    conn: &C,
    request: AdjustInventoryRequest,
    user_id: i32,
) -> Result<inventory_transaction::Model, ServiceError> {
    let inventory = InventoryRepository::lock_for_update(conn, &[request.inventory_id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("inventory", request.inventory_id))?;

    let delta = request.adjustment_quantity;
    let new_quantity = if delta >= 0 {
        ledger::increase(&inventory, delta)?
    } else {
        match delta
            .checked_neg()
            .map(|amount| ledger::decrease(&inventory, amount))
        {
            Some(Ok(quantity)) => quantity,
            Some(Err(ServiceError::InsufficientStock(_))) | None => {
                return Err(ServiceError::InvalidAdjustment(format!(
                    "resulting quantity cannot be negative: {} {}",
                    inventory.quantity, delta
                )))
            }
            Some(Err(other)) => return Err(other),
        }
    };

    ledger::store_quantity(conn, &inventory, new_quantity).await?;

    ledger::record_transaction(
        conn,
        TransactionRecord::new(
            inventory.item_id,
            Some(inventory.location_id),
            Some(inventory.location_id),
            TransactionType::Adjustment,
            delta,
            user_id,
            request.notes,
        ),
    )
    .await
}
