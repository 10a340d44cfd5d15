use chrono::Utc;
use sea_orm::{ActiveValue::Set, IntoActiveModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::location,
    errors::ServiceError,
    repositories::{
        location_repository::{ItemInLocation, LocationSearchFilter},
        LocationRepository, Page, PageRequest,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 50))]
    pub center_name: String,
    #[validate(length(min = 1, max = 30))]
    pub zone: String,
    #[validate(length(min = 1, max = 30))]
    pub bin_code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl LocationRequest {
    pub fn new(
        center_name: impl Into<String>,
        zone: impl Into<String>,
        bin_code: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            center_name: center_name.into(),
            zone: zone.into(),
            bin_code: bin_code.into(),
            is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub id: i32,
    pub center_name: String,
    pub zone: String,
    pub bin_code: String,
    pub is_active: bool,
}

impl From<location::Model> for LocationResponse {
    fn from(model: location::Model) -> Self {
        Self {
            id: model.id,
            center_name: model.center_name,
            zone: model.zone,
            bin_code: model.bin_code,
            is_active: model.is_active,
        }
    }
}

/// A bin and everything stocked in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    #[serde(flatten)]
    pub location: LocationResponse,
    pub inventories: Vec<ItemInLocation>,
}

#[derive(Clone)]
pub struct LocationService {
    db: Arc<DbPool>,
}

impl LocationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(bin_code = %request.bin_code))]
    pub async fn create(&self, request: LocationRequest) -> Result<LocationResponse, ServiceError> {
        request.validate()?;
        self.ensure_unique(&request, None).await?;

        let now = Utc::now();
        let model = location::ActiveModel {
            center_name: Set(request.center_name.clone()),
            zone: Set(request.zone.clone()),
            bin_code: Set(request.bin_code.clone()),
            is_active: Set(request.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = LocationRepository::insert(self.db.as_ref(), model)
            .await
            .map_err(|err| ServiceError::from_write_err(err, bin_conflict(&request.bin_code)))?;

        info!(location_id = saved.id, "location created");
        Ok(saved.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i32,
        request: LocationRequest,
    ) -> Result<LocationResponse, ServiceError> {
        request.validate()?;
        let existing = self.find(id).await?;
        self.ensure_unique(&request, Some(id)).await?;

        let mut active = existing.into_active_model();
        active.center_name = Set(request.center_name.clone());
        active.zone = Set(request.zone.clone());
        active.bin_code = Set(request.bin_code.clone());
        active.is_active = Set(request.is_active);
        active.updated_at = Set(Utc::now());

        let saved = LocationRepository::update(self.db.as_ref(), active)
            .await
            .map_err(|err| ServiceError::from_write_err(err, bin_conflict(&request.bin_code)))?;
        Ok(saved.into())
    }

    pub async fn search(
        &self,
        filter: &LocationSearchFilter,
        request: PageRequest,
    ) -> Result<Page<LocationResponse>, ServiceError> {
        let page = LocationRepository::search(self.db.as_ref(), filter, request).await?;
        Ok(page.map(LocationResponse::from))
    }

    pub async fn detail(&self, id: i32) -> Result<LocationDetail, ServiceError> {
        let location = self.find(id).await?;
        let inventories = LocationRepository::items_in_location(self.db.as_ref(), id).await?;
        Ok(LocationDetail {
            location: location.into(),
            inventories,
        })
    }

    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: i32) -> Result<LocationResponse, ServiceError> {
        let existing = self.find(id).await?;
        let is_active = !existing.is_active;

        let mut active = existing.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        let saved = LocationRepository::update(self.db.as_ref(), active).await?;

        info!(location_id = id, is_active, "location toggled");
        Ok(saved.into())
    }

    pub async fn center_names(&self) -> Result<Vec<String>, ServiceError> {
        Ok(LocationRepository::center_names(self.db.as_ref()).await?)
    }

    pub async fn zones_by_center(&self, center_name: &str) -> Result<Vec<String>, ServiceError> {
        Ok(LocationRepository::zones_by_center(self.db.as_ref(), center_name).await?)
    }

    async fn find(&self, id: i32) -> Result<location::Model, ServiceError> {
        LocationRepository::find_by_id(self.db.as_ref(), id)
            .await?
            .ok_or_else(|| ServiceError::not_found("location", id))
    }

    async fn ensure_unique(
        &self,
        request: &LocationRequest,
        exclude_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        if LocationRepository::triple_taken(
            db,
            &request.center_name,
            &request.zone,
            &request.bin_code,
            exclude_id,
        )
        .await?
        {
            return Err(ServiceError::Conflict(format!(
                "location {}/{}/{} already exists",
                request.center_name, request.zone, request.bin_code
            )));
        }
        if LocationRepository::bin_code_taken(db, &request.bin_code, exclude_id).await? {
            return Err(ServiceError::Conflict(bin_conflict(&request.bin_code)));
        }
        Ok(())
    }
}

fn bin_conflict(bin_code: &str) -> String {
    format!("bin code {} already exists", bin_code)
}
