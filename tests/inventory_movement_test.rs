mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;
use stockflow_api::{
    entities::inventory_transaction::TransactionType, errors::ServiceError,
    services::movement::MoveInventoryRequest,
};

struct Fixture {
    app: TestApp,
    item_id: i32,
    source_id: i32,
    source_location: i32,
    target_location: i32,
}

async fn fixture(source_quantity: i32) -> Fixture {
    let app = TestApp::new().await;
    let category = app.seed_category("Electronics", "ELEC").await;
    let item = app.seed_item("Widget", category).await;
    let source_location = app.seed_location("Seoul DC", "A", "A-01-01").await;
    let target_location = app.seed_location("Seoul DC", "B", "B-01-01").await;
    let source = app
        .seed_inventory(item.id, source_location, source_quantity)
        .await;
    Fixture {
        app,
        item_id: item.id,
        source_id: source.id,
        source_location,
        target_location,
    }
}

#[tokio::test]
async fn move_splits_stock_and_records_one_movement() {
    let f = fixture(100).await;

    let response = f
        .app
        .request_authenticated(
            Method::POST,
            "/api/inventory/move",
            Some(json!({
                "itemId": f.item_id,
                "fromBinCode": "A-01-01",
                "toBinCode": "B-01-01",
                "quantity": 50,
                "notes": "rebalance"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(f.app.quantity(f.source_id).await, 50);

    let transactions = f.app.transactions().await;
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.transaction_type, TransactionType::Movement);
    assert_eq!(tx.quantity, 50);
    assert_eq!(tx.item_id, f.item_id);
    assert_eq!(tx.from_location_id, Some(f.source_location));
    assert_eq!(tx.to_location_id, Some(f.target_location));
    assert_eq!(tx.user_id, f.app.user_id);
    assert_eq!(tx.notes.as_deref(), Some("rebalance"));

    let status = f
        .app
        .request_authenticated(Method::GET, "/api/inventory/status?binCode=B-01-01", None)
        .await;
    assert_eq!(status.status(), StatusCode::OK);
    let body = body_json(status).await;
    assert_eq!(body["data"][0]["quantity"], 50);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn move_into_existing_row_adds_to_it() {
    let f = fixture(30).await;
    let target = f.app.seed_inventory(f.item_id, f.target_location, 5).await;

    f.app
        .state
        .services
        .movement
        .move_stock(
            MoveInventoryRequest::new(f.item_id, "A-01-01", "B-01-01", 30, None),
            f.app.user_id,
        )
        .await
        .expect("movement succeeds");

    assert_eq!(f.app.quantity(f.source_id).await, 0);
    assert_eq!(f.app.quantity(target.id).await, 35);
}

#[tokio::test]
async fn move_to_same_bin_is_rejected_without_side_effects() {
    let f = fixture(100).await;

    let response = f
        .app
        .request_authenticated(
            Method::POST,
            "/api/inventory/move",
            Some(json!({
                "itemId": f.item_id,
                "fromBinCode": "A-01-01",
                "toBinCode": "A-01-01",
                "quantity": 10
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_MOVEMENT");

    assert_eq!(f.app.quantity(f.source_id).await, 100);
    assert_eq!(f.app.transaction_count().await, 0);
}

#[tokio::test]
async fn non_positive_quantity_is_an_invalid_movement() {
    let f = fixture(100).await;
    let movement = &f.app.state.services.movement;

    for quantity in [0, -5] {
        let err = movement
            .move_stock(
                MoveInventoryRequest::new(f.item_id, "A-01-01", "B-01-01", quantity, None),
                f.app.user_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMovement(_)), "{err:?}");
    }
    assert_eq!(f.app.transaction_count().await, 0);
}

#[tokio::test]
async fn overdraw_returns_422_and_changes_nothing() {
    let f = fixture(20).await;

    let response = f
        .app
        .request_authenticated(
            Method::POST,
            "/api/inventory/move",
            Some(json!({
                "itemId": f.item_id,
                "fromBinCode": "A-01-01",
                "toBinCode": "B-01-01",
                "quantity": 50
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    assert_eq!(f.app.quantity(f.source_id).await, 20);
    assert_eq!(f.app.transaction_count().await, 0);

    let status = f
        .app
        .request_authenticated(Method::GET, "/api/inventory/status?binCode=B-01-01", None)
        .await;
    let body = body_json(status).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let f = fixture(10).await;
    let movement = &f.app.state.services.movement;

    let cases = [
        MoveInventoryRequest::new(9_999, "A-01-01", "B-01-01", 1, None),
        MoveInventoryRequest::new(f.item_id, "Z-99-99", "B-01-01", 1, None),
        MoveInventoryRequest::new(f.item_id, "A-01-01", "Z-99-99", 1, None),
        // no stock row in the source bin
        MoveInventoryRequest::new(f.item_id, "B-01-01", "A-01-01", 1, None),
    ];
    for request in cases {
        let err = movement
            .move_stock(request.clone(), f.app.user_id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::NotFound(_)),
            "{request:?} -> {err:?}"
        );
    }
    assert_eq!(f.app.quantity(f.source_id).await, 10);
    assert_eq!(f.app.transaction_count().await, 0);
}

#[tokio::test]
async fn move_requires_authentication() {
    let f = fixture(10).await;

    let response = f
        .app
        .request(
            Method::POST,
            "/api/inventory/move",
            Some(json!({
                "itemId": f.item_id,
                "fromBinCode": "A-01-01",
                "toBinCode": "B-01-01",
                "quantity": 1
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(f.app.quantity(f.source_id).await, 10);
}
