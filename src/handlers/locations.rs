use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{created_response, PaginatedResponse, PaginationParams};
use crate::{
    errors::ServiceError,
    repositories::location_repository::LocationSearchFilter,
    services::locations::{LocationDetail, LocationRequest, LocationResponse},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ZonesQuery {
    pub center_name: String,
}

pub fn locations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_locations).post(create_location))
        .route("/center-names", get(center_names))
        .route("/zones-by-center", get(zones_by_center))
        .route("/:id", get(location_detail).put(update_location))
        .route("/:id/toggle-active", patch(toggle_location))
}

#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = LocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Bin already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.create(request).await?;
    Ok(created_response(location))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(("id" = i32, Path, description = "Location id")),
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Bin already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<LocationResponse>, ServiceError> {
    Ok(Json(state.services.locations.update(id, request).await?))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    params(LocationSearchFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of locations", body = PaginatedResponse<LocationResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn search_locations(
    State(state): State<AppState>,
    Query(filter): Query<LocationSearchFilter>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<LocationResponse>>, ServiceError> {
    let page = state
        .services
        .locations
        .search(&filter, paging.to_page_request(&state.config))
        .await?;
    Ok(Json(page.into()))
}

/// A bin with the items stocked in it
#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(("id" = i32, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location detail", body = LocationDetail),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn location_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LocationDetail>, ServiceError> {
    Ok(Json(state.services.locations.detail(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/locations/{id}/toggle-active",
    params(("id" = i32, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location with flipped active flag", body = LocationResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn toggle_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LocationResponse>, ServiceError> {
    Ok(Json(state.services.locations.toggle_active(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/locations/center-names",
    responses((status = 200, description = "Distinct center names, sorted", body = Vec<String>)),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn center_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ServiceError> {
    Ok(Json(state.services.locations.center_names().await?))
}

#[utoipa::path(
    get,
    path = "/api/locations/zones-by-center",
    params(ZonesQuery),
    responses((status = 200, description = "Distinct zones of the center, sorted", body = Vec<String>)),
    security(("bearer_auth" = [])),
    tag = "locations"
)]
pub async fn zones_by_center(
    State(state): State<AppState>,
    Query(query): Query<ZonesQuery>,
) -> Result<Json<Vec<String>>, ServiceError> {
    Ok(Json(
        state
            .services
            .locations
            .zones_by_center(&query.center_name)
            .await?,
    ))
}
