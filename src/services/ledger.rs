//! Stock ledger.
//!
//! Quantity arithmetic is pure: [`increase`] and [`decrease`] compute the next quantity and leave
//! the row untouched. Callers persist the result with [`store_quantity`], a compare-and-set write,
//! and append the matching audit row with [`record_transaction`].

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ConnectionTrait};
use tracing::debug;

use crate::{
    entities::{
        inventory,
        inventory_transaction::{self, TransactionType},
    },
    errors::ServiceError,
    repositories::{InventoryRepository, TransactionRepository},
};

/// Quantity after receiving `amount` units.
pub fn increase(inventory: &inventory::Model, amount: i32) -> Result<i32, ServiceError> {
    if amount < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "increase amount must not be negative, got {}",
            amount
        )));
    }
    inventory.quantity.checked_add(amount).ok_or_else(|| {
        ServiceError::InvalidArgument(format!(
            "quantity overflow: {} + {}",
            inventory.quantity, amount
        ))
    })
}

/// Quantity after removing `amount` units. Never clamps.
pub fn decrease(inventory: &inventory::Model, amount: i32) -> Result<i32, ServiceError> {
    if amount < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "decrease amount must not be negative, got {}",
            amount
        )));
    }
    if amount > inventory.quantity {
        return Err(ServiceError::InsufficientStock(format!(
            "inventory {} holds {}, requested {}",
            inventory.id, inventory.quantity, amount
        )));
    }
    Ok(inventory.quantity - amount)
}

/// Persists `new_quantity` for a row read earlier in the same unit of work.
pub async fn store_quantity<C: ConnectionTrait>(
    conn: &C,
    inventory: &inventory::Model,
    new_quantity: i32,
) -> Result<(), ServiceError> {
    let written = InventoryRepository::compare_and_set_quantity(
        conn,
        inventory.id,
        inventory.quantity,
        new_quantity,
    )
    .await?;
    if !written {
        return Err(ServiceError::ConcurrentModification(format!(
            "inventory {} changed while it was being updated",
            inventory.id
        )));
    }
    debug!(
        inventory_id = inventory.id,
        from = inventory.quantity,
        to = new_quantity,
        "inventory quantity stored"
    );
    Ok(())
}

/// One audit entry waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub item_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub user_id: i32,
    pub notes: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        item_id: i32,
        from_location_id: Option<i32>,
        to_location_id: Option<i32>,
        transaction_type: TransactionType,
        quantity: i32,
        user_id: i32,
        notes: Option<String>,
    ) -> Self {
        Self {
            item_id,
            from_location_id,
            to_location_id,
            transaction_type,
            quantity,
            user_id,
            notes,
        }
    }
}

/// Appends one immutable audit row stamped with the current time.
pub async fn record_transaction<C: ConnectionTrait>(
    conn: &C,
    record: TransactionRecord,
) -> Result<inventory_transaction::Model, ServiceError> {
    let model = inventory_transaction::ActiveModel {
        item_id: Set(record.item_id),
        from_location_id: Set(record.from_location_id),
        to_location_id: Set(record.to_location_id),
        transaction_type: Set(record.transaction_type),
        quantity: Set(record.quantity),
        transaction_date: Set(Utc::now()),
        user_id: Set(record.user_id),
        notes: Set(record.notes),
        ..Default::default()
    };
    Ok(TransactionRepository::insert(conn, model).await?)
}
