use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::common::{created_response, no_content_response, PaginatedResponse, PaginationParams};
use crate::{
    errors::ServiceError,
    repositories::item_repository::{ItemSearchFilter, ItemSummary},
    services::items::{ItemRequest, ItemResponse},
    AppState,
};

pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_item))
        .route("/search", get(search_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

/// Register an item; its SKU is derived from the category code and the new id
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item registered", body = ItemResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU conflict", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn register_item(
    State(state): State<AppState>,
    Json(request): Json<ItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.items.register(request).await?;
    Ok(created_response(item))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemResponse>, ServiceError> {
    Ok(Json(state.services.items.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 404, description = "Item or category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU conflict", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ItemRequest>,
) -> Result<Json<ItemResponse>, ServiceError> {
    Ok(Json(state.services.items.update(id, request).await?))
}

/// Delete an item that holds no stock
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Item still holds stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.items.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/items/search",
    params(ItemSearchFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of items with total stock", body = PaginatedResponse<ItemSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn search_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemSearchFilter>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ItemSummary>>, ServiceError> {
    let page = state
        .services
        .items
        .search(&filter, paging.to_page_request(&state.config))
        .await?;
    Ok(Json(page.into()))
}
