use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use super::common::{PaginatedResponse, PaginationParams};
use crate::{
    errors::ServiceError,
    repositories::transaction_repository::{TransactionHistory, TransactionHistoryFilter},
    AppState,
};

pub fn transactions_router() -> Router<AppState> {
    Router::new().route("/history", get(transaction_history))
}

/// Audit log of stock mutations, newest first
#[utoipa::path(
    get,
    path = "/api/transactions/history",
    params(TransactionHistoryFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of transactions", body = PaginatedResponse<TransactionHistory>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn transaction_history(
    State(state): State<AppState>,
    Query(filter): Query<TransactionHistoryFilter>,
    Query(paging): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .transactions
        .history(&filter, paging.to_page_request(&state.config))
        .await?;
    Ok(Json(PaginatedResponse::from(page)))
}
