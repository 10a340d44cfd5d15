use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use super::{fetch_page, Page, PageRequest};
use crate::entities::category::{self, Entity as Category};

/// Data access for categories
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<category::Model>, DbErr> {
        Category::find_by_id(id).one(conn).await
    }

    pub async fn find_by_code<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<Option<category::Model>, DbErr> {
        Category::find()
            .filter(category::Column::Code.eq(code))
            .one(conn)
            .await
    }

    /// True when another category (not `exclude_id`) already uses `name` or `code`
    pub async fn name_or_code_taken<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = Category::find().filter(
            Condition::any()
                .add(category::Column::Name.eq(name))
                .add(category::Column::Code.eq(code)),
        );
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.count(conn).await? > 0)
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        model: category::ActiveModel,
    ) -> Result<category::Model, DbErr> {
        model.insert(conn).await
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        model: category::ActiveModel,
    ) -> Result<category::Model, DbErr> {
        model.update(conn).await
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        request: PageRequest,
    ) -> Result<Page<category::Model>, DbErr> {
        fetch_page(
            conn,
            Category::find().order_by_asc(category::Column::Id),
            request,
        )
        .await
    }
}
