use chrono::Utc;
use sea_orm::{ActiveValue::Set, IntoActiveModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::category,
    errors::ServiceError,
    repositories::{CategoryRepository, Page, PageRequest},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 12))]
    pub code: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl CategoryRequest {
    pub fn new(name: impl Into<String>, code: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            description: model.description,
        }
    }
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create(&self, request: CategoryRequest) -> Result<CategoryResponse, ServiceError> {
        request.validate()?;
        let db = self.db.as_ref();

        if CategoryRepository::name_or_code_taken(db, &request.name, &request.code, None).await? {
            return Err(duplicate(&request));
        }

        let now = Utc::now();
        let model = category::ActiveModel {
            name: Set(request.name.clone()),
            code: Set(request.code.clone()),
            description: Set(request.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = CategoryRepository::insert(db, model)
            .await
            .map_err(|err| ServiceError::from_write_err(err, duplicate_message(&request)))?;

        info!(category_id = saved.id, "category created");
        Ok(saved.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i32,
        request: CategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        request.validate()?;
        let db = self.db.as_ref();

        let existing = CategoryRepository::find_by_id(db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))?;

        if CategoryRepository::name_or_code_taken(db, &request.name, &request.code, Some(id))
            .await?
        {
            return Err(duplicate(&request));
        }

        let mut active = existing.into_active_model();
        active.name = Set(request.name.clone());
        active.code = Set(request.code.clone());
        active.description = Set(request.description.clone());
        active.updated_at = Set(Utc::now());

        let saved = CategoryRepository::update(db, active)
            .await
            .map_err(|err| ServiceError::from_write_err(err, duplicate_message(&request)))?;
        Ok(saved.into())
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<CategoryResponse>, ServiceError> {
        let page = CategoryRepository::list(self.db.as_ref(), request).await?;
        Ok(page.map(CategoryResponse::from))
    }
}

fn duplicate_message(request: &CategoryRequest) -> String {
    format!(
        "category name '{}' or code '{}' already exists",
        request.name, request.code
    )
}

fn duplicate(request: &CategoryRequest) -> ServiceError {
    ServiceError::Conflict(duplicate_message(request))
}
