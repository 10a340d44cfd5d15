#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    middleware,
    response::Response,
    Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde_json::Value;
use stockflow_api::{
    auth::RegisterRequest,
    config::AppConfig,
    db,
    entities::{inventory, inventory_transaction},
    middleware_helpers::request_id_middleware,
    services::{
        categories::CategoryRequest,
        items::{ItemRequest, ItemResponse},
        locations::LocationRequest,
    },
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Application backed by a private SQLite database.
///
/// [`TestApp::new`] uses an in-memory database on a single connection. [`TestApp::with_file_pool`]
/// puts the database in a temporary directory behind a pool of several connections, so units of
/// work really overlap.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    pub user_id: i32,
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build("sqlite::memory:".to_string(), 1, None).await
    }

    pub async fn with_file_pool(max_connections: u32) -> Self {
        let dir = TempDir::new().expect("create temp dir for test database");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("stockflow.db").display()
        );
        Self::build(url, max_connections, Some(dir)).await
    }

    async fn build(database_url: String, max_connections: u32, dir: Option<TempDir>) -> Self {
        let mut cfg = AppConfig::new(
            database_url,
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = max_connections;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = stockflow_api::app_router(state.clone())
            .layer(middleware::from_fn(request_id_middleware));

        let auth = state
            .auth
            .register(RegisterRequest {
                username: "operator".to_string(),
                password: "operator-password".to_string(),
            })
            .await
            .expect("register default test user");

        Self {
            router,
            state,
            token: auth.access_token,
            user_id: auth.user.id,
            _dir: dir,
        }
    }

    /// Bearer token of the default user
    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        self.request_with_headers(method, uri, body, token, &[])
            .await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for requests as the default user.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_category(&self, name: &str, code: &str) -> i32 {
        self.state
            .services
            .categories
            .create(CategoryRequest::new(name, code, None))
            .await
            .expect("seed category")
            .id
    }

    pub async fn seed_location(&self, center: &str, zone: &str, bin: &str) -> i32 {
        self.state
            .services
            .locations
            .create(LocationRequest::new(center, zone, bin, true))
            .await
            .expect("seed location")
            .id
    }

    pub async fn seed_item(&self, name: &str, category_id: i32) -> ItemResponse {
        self.state
            .services
            .items
            .register(ItemRequest::new(name, 1_000, 5, category_id))
            .await
            .expect("seed item")
    }

    /// Inserts an inventory row directly, bypassing the ledger.
    pub async fn seed_inventory(
        &self,
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
        .insert(self.state.db.as_ref())
        .await
        .expect("seed inventory")
    }

    pub async fn quantity(&self, inventory_id: i32) -> i32 {
        inventory::Entity::find_by_id(inventory_id)
            .one(self.state.db.as_ref())
            .await
            .expect("load inventory")
            .expect("inventory exists")
            .quantity
    }

    /// Quantity of `item_id` in `location_id`, if a row exists
    pub async fn quantity_at(&self, item_id: i32, location_id: i32) -> Option<i32> {
        inventory::Entity::find()
            .filter(inventory::Column::ItemId.eq(item_id))
            .filter(inventory::Column::LocationId.eq(location_id))
            .one(self.state.db.as_ref())
            .await
            .expect("load inventory")
            .map(|row| row.quantity)
    }

    pub async fn transactions(&self) -> Vec<inventory_transaction::Model> {
        inventory_transaction::Entity::find()
            .all(self.state.db.as_ref())
            .await
            .expect("load transactions")
    }

    pub async fn transaction_count(&self) -> u64 {
        inventory_transaction::Entity::find()
            .count(self.state.db.as_ref())
            .await
            .expect("count transactions")
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is json")
}
