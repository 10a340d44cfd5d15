use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::common::{PaginatedResponse, PaginationParams};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    repositories::inventory_repository::{InventoryStatusFilter, InventorySummary},
    services::{adjustment::AdjustInventoryRequest, movement::MoveInventoryRequest},
    AppState,
};

pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route("/adjust", post(adjust_inventory))
        .route("/move", post(move_inventory))
        .route("/status", get(inventory_status))
}

/// Apply a signed quantity correction to one inventory row
#[utoipa::path(
    post,
    path = "/api/inventory/adjust",
    request_body = AdjustInventoryRequest,
    responses(
        (status = 201, description = "Adjustment recorded"),
        (status = 400, description = "Resulting quantity would be negative", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AdjustInventoryRequest>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .adjustment
        .adjust(request, auth.user_id)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Move stock of one item between two bins
#[utoipa::path(
    post,
    path = "/api/inventory/move",
    request_body = MoveInventoryRequest,
    responses(
        (status = 201, description = "Movement recorded"),
        (status = 400, description = "Invalid movement", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item, bin or inventory not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn move_inventory(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<MoveInventoryRequest>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .movement
        .move_stock(request, auth.user_id)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Per-bin stock with item, category and location details
#[utoipa::path(
    get,
    path = "/api/inventory/status",
    params(InventoryStatusFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of inventory rows", body = PaginatedResponse<InventorySummary>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn inventory_status(
    State(state): State<AppState>,
    Query(filter): Query<InventoryStatusFilter>,
    Query(paging): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .inventory_query
        .status(&filter, paging.to_page_request(&state.config))
        .await?;
    Ok(Json(PaginatedResponse::from(page)))
}
