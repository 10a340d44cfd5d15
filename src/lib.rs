//! Warehouse inventory backend.
//!
//! Items, categories and storage bins, per-bin stock with movements and adjustments, and an
//! append-only transaction history, served as a JSON API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config), db.clone()));
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Everything under `/api`. Auth endpoints other than logout are public; the rest require a
/// bearer access token.
pub fn api_routes(auth_service: Arc<AuthService>) -> Router<AppState> {
    let protected = Router::new()
        .nest("/inventory", handlers::inventory::inventory_router())
        .nest("/transactions", handlers::transactions::transactions_router())
        .nest("/items", handlers::items::items_router())
        .nest("/categories", handlers::categories::categories_router())
        .nest("/locations", handlers::locations::locations_router())
        .with_auth(auth_service.clone());

    Router::new()
        .nest("/auth", auth::auth_routes(auth_service))
        .merge(protected)
}

/// Full application router without the outer HTTP layers
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes(state.auth.clone()))
        .merge(openapi::swagger_ui())
        .with_state(state)
}
