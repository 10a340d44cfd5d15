//! Rows for service-level tests that need real foreign keys.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};

use crate::{
    db::{establish_connection_with_config, run_migrations, DbConfig},
    entities::{category, inventory, item, location},
};

pub async fn memory_db() -> DatabaseConnection {
    let db = establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        ..Default::default()
    })
    .await
    .unwrap();
    run_migrations(&db).await.unwrap();
    db
}

pub async fn item(db: &DatabaseConnection) -> item::Model {
    let now = Utc::now();
    let category = category::ActiveModel {
        name: Set("Hardware".into()),
        code: Set("HW".into()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    item::ActiveModel {
        name: Set("Hex bolt".into()),
        sku: Set(None),
        price: Set(25),
        safety_stock: Set(0),
        category_id: Set(category.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn bin(db: &DatabaseConnection, bin_code: &str) -> location::Model {
    let now = Utc::now();
    location::ActiveModel {
        center_name: Set("Main".into()),
        zone: Set("A".into()),
        bin_code: Set(bin_code.into()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn stock(
    db: &DatabaseConnection,
    item_id: i32,
    location_id: i32,
    quantity: i32,
) -> inventory::Model {
    let now = Utc::now();
    inventory::ActiveModel {
        item_id: Set(item_id),
        location_id: Set(location_id),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
