mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;
use stockflow_api::services::adjustment::AdjustInventoryRequest;

#[tokio::test]
async fn duplicate_category_name_or_code_conflicts() {
    let app = TestApp::new().await;

    let created = app
        .request_authenticated(
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "Electronics", "code": "ELEC" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    for body in [
        json!({ "name": "Electronics", "code": "EL2" }),
        json!({ "name": "Gadgets", "code": "ELEC" }),
    ] {
        let response = app
            .request_authenticated(Method::POST, "/api/categories", Some(body))
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "CONFLICT");
    }

    let list = app
        .request_authenticated(Method::GET, "/api/categories?page=1&per_page=10", None)
        .await;
    let body = body_json(list).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["code"], "ELEC");
}

#[tokio::test]
async fn category_validation_errors_are_400() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "", "code": "WAYTOOLONGCODE" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn registered_item_gets_category_sku() {
    let app = TestApp::new().await;
    let category = app.seed_category("Electronics", "ELEC").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/items",
            Some(json!({
                "name": "Keyboard",
                "price": 45_000,
                "safetyStock": 3,
                "categoryId": category
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id = body["id"].as_i64().expect("id");
    assert_eq!(body["sku"], format!("ELEC{id}"));
    assert_eq!(body["categoryName"], "Electronics");

    let fetched = app
        .request_authenticated(Method::GET, &format!("/api/items/{id}"), None)
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["name"], "Keyboard");
}

#[tokio::test]
async fn item_sku_changes_only_with_category() {
    let app = TestApp::new().await;
    let elec = app.seed_category("Electronics", "ELEC").await;
    let tool = app.seed_category("Tools", "TOOL").await;
    let item = app.seed_item("Drill", elec).await;

    let renamed = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/items/{}", item.id),
            Some(json!({ "name": "Cordless Drill", "price": 90_000, "safetyStock": 2, "categoryId": elec })),
        )
        .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = body_json(renamed).await;
    assert_eq!(body["sku"], format!("ELEC{}", item.id));
    assert_eq!(body["name"], "Cordless Drill");

    let moved = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/items/{}", item.id),
            Some(json!({ "name": "Cordless Drill", "price": 90_000, "safetyStock": 2, "categoryId": tool })),
        )
        .await;
    assert_eq!(body_json(moved).await["sku"], format!("TOOL{}", item.id));
}

#[tokio::test]
async fn item_with_unknown_category_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/items",
            Some(json!({ "name": "Orphan", "price": 1, "safetyStock": 0, "categoryId": 777 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_with_stock_cannot_be_deleted() {
    let app = TestApp::new().await;
    let category = app.seed_category("Electronics", "ELEC").await;
    let item = app.seed_item("Monitor", category).await;
    let location = app.seed_location("Seoul DC", "A", "A-01-01").await;
    let inventory = app.seed_inventory(item.id, location, 3).await;
    let uri = format!("/api/items/{}", item.id);

    let response = app
        .request_authenticated(Method::DELETE, &uri, None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");

    app.state
        .services
        .adjustment
        .adjust(AdjustInventoryRequest::new(inventory.id, -3, None), app.user_id)
        .await
        .expect("drain stock");

    let response = app
        .request_authenticated(Method::DELETE, &uri, None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = app.request_authenticated(Method::GET, &uri, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    // the audit trail outlives the item
    let history = app
        .request_authenticated(
            Method::GET,
            &format!("/api/transactions/history?itemId={}", item.id),
            None,
        )
        .await;
    let body = body_json(history).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert!(body["data"][0]["itemName"].is_null());
}

#[tokio::test]
async fn item_search_filters_and_sums_stock() {
    let app = TestApp::new().await;
    let elec = app.seed_category("Electronics", "ELEC").await;
    let tool = app.seed_category("Tools", "TOOL").await;
    let mouse = app.seed_item("Wireless Mouse", elec).await;
    let cable = app.seed_item("USB Cable", elec).await;
    app.seed_item("Wrench", tool).await;

    let a = app.seed_location("Seoul DC", "A", "A-01-01").await;
    let b = app.seed_location("Seoul DC", "B", "B-01-01").await;
    app.seed_inventory(mouse.id, a, 7).await;
    app.seed_inventory(mouse.id, b, 5).await;
    app.seed_inventory(cable.id, a, 2).await;

    let by_category = app
        .request_authenticated(
            Method::GET,
            &format!("/api/items/search?categoryId={elec}"),
            None,
        )
        .await;
    let body = body_json(by_category).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"][0]["totalQuantity"], 12);
    assert_eq!(body["data"][0]["categoryName"], "Electronics");

    let stocked = app
        .request_authenticated(Method::GET, "/api/items/search?minQuantity=10", None)
        .await;
    let body = body_json(stocked).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Wireless Mouse");

    let by_name = app
        .request_authenticated(Method::GET, "/api/items/search?name=Cable", None)
        .await;
    let body = body_json(by_name).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["sku"], format!("ELEC{}", cable.id));
}

#[tokio::test]
async fn item_search_pages_through_results() {
    let app = TestApp::new().await;
    let category = app.seed_category("Bulk", "BULK").await;
    for n in 0..5 {
        app.seed_item(&format!("Box {n}"), category).await;
    }

    let response = app
        .request_authenticated(Method::GET, "/api/items/search?page=2&per_page=2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["name"], "Box 2");
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["perPage"], 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["totalPages"], 3);
}
