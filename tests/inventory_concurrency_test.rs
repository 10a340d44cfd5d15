mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use stockflow_api::{
    errors::ServiceError,
    services::{adjustment::AdjustInventoryRequest, movement::MoveInventoryRequest},
};

/// Connections in the file-backed pool; enough for spawned units of work to overlap.
const POOL_SIZE: u32 = 5;

#[tokio::test]
async fn concurrent_moves_cannot_overdraw_a_bin() {
    let app = TestApp::with_file_pool(POOL_SIZE).await;
    let category = app.seed_category("Parts", "PART").await;
    let item = app.seed_item("Bolt", category).await;
    let from = app.seed_location("Incheon DC", "A", "A-01-01").await;
    app.seed_location("Incheon DC", "B", "B-01-01").await;
    let source = app.seed_inventory(item.id, from, 100).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let movement = app.state.services.movement.clone();
        let user_id = app.user_id;
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            movement
                .move_stock(
                    MoveInventoryRequest::new(item_id, "A-01-01", "B-01-01", 60, None),
                    user_id,
                )
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(ServiceError::InsufficientStock(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 1, "exactly one 60-unit move fits into 100");
    assert_eq!(app.quantity(source.id).await, 40);
    assert_eq!(app.transaction_count().await, 1);
}

#[tokio::test]
async fn concurrent_adjustments_are_not_lost() {
    let app = TestApp::with_file_pool(POOL_SIZE).await;
    let category = app.seed_category("Parts", "PART").await;
    let item = app.seed_item("Nut", category).await;
    let first_bin = app.seed_location("Incheon DC", "A", "A-01-01").await;
    let second_bin = app.seed_location("Incheon DC", "A", "A-01-02").await;
    let first = app.seed_inventory(item.id, first_bin, 10).await;
    let second = app.seed_inventory(item.id, second_bin, 10).await;

    let tasks = 20;
    let mut handles = Vec::new();
    for i in 0..tasks {
        let adjustment = app.state.services.adjustment.clone();
        let user_id = app.user_id;
        let inventory_id = if i % 2 == 0 { first.id } else { second.id };
        handles.push(tokio::spawn(async move {
            adjustment
                .adjust(AdjustInventoryRequest::new(inventory_id, 1, None), user_id)
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("every adjustment commits");
    }

    assert_eq!(app.quantity(first.id).await, 20);
    assert_eq!(app.quantity(second.id).await, 20);
    assert_eq!(app.transaction_count().await, tasks as u64);
}

#[tokio::test]
async fn opposite_moves_between_two_bins_all_commit() {
    let app = TestApp::with_file_pool(POOL_SIZE).await;
    let category = app.seed_category("Parts", "PART").await;
    let item = app.seed_item("Washer", category).await;
    let a_bin = app.seed_location("Incheon DC", "A", "A-01-01").await;
    let b_bin = app.seed_location("Incheon DC", "B", "B-01-01").await;
    let a = app.seed_inventory(item.id, a_bin, 50).await;
    let b = app.seed_inventory(item.id, b_bin, 50).await;

    let tasks = 12;
    let mut handles = Vec::new();
    for i in 0..tasks {
        let movement = app.state.services.movement.clone();
        let user_id = app.user_id;
        let item_id = item.id;
        let (from, to) = if i % 2 == 0 {
            ("A-01-01", "B-01-01")
        } else {
            ("B-01-01", "A-01-01")
        };
        handles.push(tokio::spawn(async move {
            movement
                .move_stock(MoveInventoryRequest::new(item_id, from, to, 3, None), user_id)
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("every move commits");
    }

    assert_eq!(app.quantity(a.id).await, 50);
    assert_eq!(app.quantity(b.id).await, 50);
    assert_eq!(app.transaction_count().await, tasks as u64);
}

#[tokio::test]
async fn concurrent_moves_into_an_empty_bin_share_one_row() {
    let app = TestApp::with_file_pool(POOL_SIZE).await;
    let category = app.seed_category("Parts", "PART").await;
    let item = app.seed_item("Rivet", category).await;
    let from = app.seed_location("Incheon DC", "A", "A-01-01").await;
    let to = app.seed_location("Incheon DC", "C", "C-01-01").await;
    let source = app.seed_inventory(item.id, from, 30).await;

    let tasks = 6;
    let mut handles = Vec::new();
    for _ in 0..tasks {
        let movement = app.state.services.movement.clone();
        let user_id = app.user_id;
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            movement
                .move_stock(
                    MoveInventoryRequest::new(item_id, "A-01-01", "C-01-01", 5, None),
                    user_id,
                )
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("every move commits");
    }

    assert_eq!(app.quantity(source.id).await, 0);
    assert_eq!(app.quantity_at(item.id, to).await, Some(30));
}

#[tokio::test]
async fn overlapping_http_adjustments_never_fail_with_a_server_error() {
    let app = Arc::new(TestApp::with_file_pool(POOL_SIZE).await);
    let category = app.seed_category("Parts", "PART").await;
    let item = app.seed_item("Clip", category).await;
    let location = app.seed_location("Incheon DC", "A", "A-01-01").await;
    let inventory = app.seed_inventory(item.id, location, 0).await;

    let tasks = 16;
    let mut handles = Vec::new();
    for _ in 0..tasks {
        let app = app.clone();
        let inventory_id = inventory.id;
        handles.push(tokio::spawn(async move {
            app.request_authenticated(
                Method::POST,
                "/api/inventory/adjust",
                Some(json!({ "inventoryId": inventory_id, "adjustmentQuantity": 2 })),
            )
            .await
            .status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.expect("task panicked"), StatusCode::CREATED);
    }
    assert_eq!(app.quantity(inventory.id).await, 2 * tasks);
}
