use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};

use super::common::{created_response, PaginatedResponse, PaginationParams};
use crate::{
    errors::ServiceError,
    services::categories::{CategoryRequest, CategoryResponse},
    AppState,
};

pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", put(update_category))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name or code already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create(request).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name or code already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ServiceError> {
    Ok(Json(state.services.categories.update(id, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of categories", body = PaginatedResponse<CategoryResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<CategoryResponse>>, ServiceError> {
    let page = state
        .services
        .categories
        .list(paging.to_page_request(&state.config))
        .await?;
    Ok(Json(page.into()))
}
