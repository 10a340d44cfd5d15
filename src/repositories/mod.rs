//! Explicit data access.
//!
//! Repositories are stateless: every function takes the connection to run on, so the same call
//! works against the pool or inside an open unit of work. They return plain models or
//! `FromQueryResult` projections, never lazily-loaded graphs.

use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, SelectorTrait};

pub mod category_repository;
pub mod inventory_repository;
pub mod item_repository;
pub mod location_repository;
pub mod transaction_repository;

pub use category_repository::CategoryRepository;
pub use inventory_repository::InventoryRepository;
pub use item_repository::ItemRepository;
pub use location_repository::LocationRepository;
pub use transaction_repository::TransactionRepository;

/// 1-based page coordinates, already clamped by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }
}

/// One page of rows plus the total row count across all pages
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Fetches one page of `query`. When the first page is not full the row count is already known,
/// so the count query is skipped.
pub async fn fetch_page<'db, C, Q>(
    conn: &'db C,
    query: Q,
    request: PageRequest,
) -> Result<Page<<Q::Selector as SelectorTrait>::Item>, DbErr>
where
    C: ConnectionTrait,
    Q: PaginatorTrait<'db, C>,
{
    let paginator = query.paginate(conn, request.per_page);
    let items = paginator.fetch_page(request.page - 1).await?;

    let total = if request.page == 1 && (items.len() as u64) < request.per_page {
        items.len() as u64
    } else {
        paginator.num_items().await?
    };

    Ok(Page {
        items,
        total,
        request,
    })
}

