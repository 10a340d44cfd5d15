mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;
use stockflow_api::{
    entities::inventory_transaction::TransactionType, errors::ServiceError,
    services::adjustment::AdjustInventoryRequest,
};

async fn stocked(quantity: i32) -> (TestApp, i32, i32) {
    let app = TestApp::new().await;
    let category = app.seed_category("Tools", "TOOL").await;
    let item = app.seed_item("Hammer", category).await;
    let location = app.seed_location("Busan DC", "A", "A-01-01").await;
    let inventory = app.seed_inventory(item.id, location, quantity).await;
    (app, inventory.id, location)
}

#[tokio::test]
async fn positive_adjustment_adds_stock_and_is_logged() {
    let (app, inventory_id, location) = stocked(20).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/inventory/adjust",
            Some(json!({
                "inventoryId": inventory_id,
                "adjustmentQuantity": 15,
                "notes": "cycle count"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.quantity(inventory_id).await, 35);

    let transactions = app.transactions().await;
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.transaction_type, TransactionType::Adjustment);
    assert_eq!(tx.quantity, 15);
    assert_eq!(tx.from_location_id, Some(location));
    assert_eq!(tx.to_location_id, Some(location));
}

#[tokio::test]
async fn negative_adjustment_records_signed_delta() {
    let (app, inventory_id, _) = stocked(20).await;

    app.state
        .services
        .adjustment
        .adjust(AdjustInventoryRequest::new(inventory_id, -20, None), app.user_id)
        .await
        .expect("draining to zero is allowed");

    assert_eq!(app.quantity(inventory_id).await, 0);
    let transactions = app.transactions().await;
    assert_eq!(transactions[0].quantity, -20);
}

#[tokio::test]
async fn adjustment_below_zero_is_rejected() {
    let (app, inventory_id, _) = stocked(20).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/inventory/adjust",
            Some(json!({ "inventoryId": inventory_id, "adjustmentQuantity": -30 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_ADJUSTMENT");

    assert_eq!(app.quantity(inventory_id).await, 20);
    assert_eq!(app.transaction_count().await, 0);
}

#[tokio::test]
async fn zero_adjustment_is_logged_as_recount() {
    let (app, inventory_id, _) = stocked(20).await;

    app.state
        .services
        .adjustment
        .adjust(
            AdjustInventoryRequest::new(inventory_id, 0, Some("recount".into())),
            app.user_id,
        )
        .await
        .expect("zero delta accepted");

    assert_eq!(app.quantity(inventory_id).await, 20);
    let transactions = app.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].quantity, 0);
}

#[tokio::test]
async fn extreme_negative_delta_is_an_invalid_adjustment() {
    let (app, inventory_id, _) = stocked(20).await;

    let err = app
        .state
        .services
        .adjustment
        .adjust(
            AdjustInventoryRequest::new(inventory_id, i32::MIN, None),
            app.user_id,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidAdjustment(_));
    assert_eq!(app.quantity(inventory_id).await, 20);
}

#[tokio::test]
async fn missing_inventory_is_not_found() {
    let (app, _, _) = stocked(20).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/inventory/adjust",
            Some(json!({ "inventoryId": 4242, "adjustmentQuantity": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.transaction_count().await, 0);
}
