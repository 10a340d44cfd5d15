use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockflow API",
        version = "0.1.0",
        description = r#"
# Stockflow warehouse inventory API

Items, categories and storage bins; stock per bin with movements and adjustments; an append-only
transaction history.

## Authentication

Register or log in under `/api/auth`, then send the access token on every other `/api` call:

```
Authorization: Bearer <access-token>
```

Refresh with `POST /api/auth/refresh` and the `X-Refresh-Token` header. A refresh token works once.

## Errors

```json
{
  "error": "Unprocessable Entity",
  "code": "INSUFFICIENT_STOCK",
  "message": "Insufficient stock: bin A-01 holds 20, requested 50",
  "request_id": "3f0c…",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints take `page` (1-based, default 1) and `per_page` (default 20, max 100) and answer
`{ "data": [...], "pagination": { "page", "perPage", "total", "totalPages" } }`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    tags(
        (name = "inventory", description = "Stock movements, adjustments and status"),
        (name = "transactions", description = "Transaction history"),
        (name = "items", description = "Item catalog"),
        (name = "categories", description = "Item categories"),
        (name = "locations", description = "Storage bins"),
        (name = "auth", description = "Accounts and tokens"),
        (name = "health", description = "Health check")
    ),
    paths(
        // Inventory
        crate::handlers::inventory::adjust_inventory,
        crate::handlers::inventory::move_inventory,
        crate::handlers::inventory::inventory_status,

        // Transactions
        crate::handlers::transactions::transaction_history,

        // Items
        crate::handlers::items::register_item,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::items::search_items,

        // Categories
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::list_categories,

        // Locations
        crate::handlers::locations::create_location,
        crate::handlers::locations::update_location,
        crate::handlers::locations::search_locations,
        crate::handlers::locations::location_detail,
        crate::handlers::locations::toggle_location,
        crate::handlers::locations::center_names,
        crate::handlers::locations::zones_by_center,

        // Auth
        crate::auth::register_handler,
        crate::auth::login_handler,
        crate::auth::refresh_token_handler,
        crate::auth::logout_handler,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::entities::inventory_transaction::TransactionType,
            crate::auth::Role,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_routes_and_bearer_scheme() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Stockflow API"));
        assert!(json.contains("/api/inventory/move"));
        assert!(json.contains("/api/transactions/history"));
        assert!(json.contains("bearer_auth"));
    }
}
