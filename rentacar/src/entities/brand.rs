use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, Filterable, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "brand")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A car manufacturer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandDto {
    pub id: Option<i64>,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
}

impl PartialEq for BrandDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for BrandDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "brand";
    const RESOURCE_NAME_PLURAL: &'static str = "brands";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("brandId", Column::BrandId, FieldKind::Long),
        FieldDescriptor::new("brandName", Column::BrandName, FieldKind::Text),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            brand_id: model.brand_id,
            brand_name: model.brand_name,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            brand_id: ActiveValue::Set(self.brand_id),
            brand_name: ActiveValue::Set(self.brand_name),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.brand_id {
            active.brand_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.brand_name {
            active.brand_name = ActiveValue::Set(Some(value));
        }
        active
    }
}

crate::criteria! {
    /// Filters accepted by `GET /api/brands`.
    pub struct BrandCriteria {
        id: i64 => "id",
        brand_id: i64 => "brandId",
        brand_name: String => "brandName",
    }
}

impl Filterable for BrandDto {
    type Criteria = BrandCriteria;
}
