use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, Filterable, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub brand_id: Option<i64>,
    pub color_id: Option<i64>,
    pub model_year: Option<String>,
    pub daily_price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A rentable car. `brand_id` and `color_id` are plain identifiers; nothing
/// checks that they resolve.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarDto {
    pub id: Option<i64>,
    pub brand_id: Option<i64>,
    pub color_id: Option<i64>,
    pub model_year: Option<String>,
    pub daily_price: Option<f64>,
    pub description: Option<String>,
}

impl PartialEq for CarDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for CarDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "car";
    const RESOURCE_NAME_PLURAL: &'static str = "cars";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("brandId", Column::BrandId, FieldKind::Long),
        FieldDescriptor::new("colorId", Column::ColorId, FieldKind::Long),
        FieldDescriptor::new("modelYear", Column::ModelYear, FieldKind::Text),
        FieldDescriptor::new("dailyPrice", Column::DailyPrice, FieldKind::Double),
        FieldDescriptor::new("description", Column::Description, FieldKind::Text),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            brand_id: model.brand_id,
            color_id: model.color_id,
            model_year: model.model_year,
            daily_price: model.daily_price,
            description: model.description,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            brand_id: ActiveValue::Set(self.brand_id),
            color_id: ActiveValue::Set(self.color_id),
            model_year: ActiveValue::Set(self.model_year),
            daily_price: ActiveValue::Set(self.daily_price),
            description: ActiveValue::Set(self.description),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.brand_id {
            active.brand_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.color_id {
            active.color_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.model_year {
            active.model_year = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.daily_price {
            active.daily_price = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.description {
            active.description = ActiveValue::Set(Some(value));
        }
        active
    }
}

crate::criteria! {
    /// Filters accepted by `GET /api/cars`.
    pub struct CarCriteria {
        id: i64 => "id",
        brand_id: i64 => "brandId",
        color_id: i64 => "colorId",
        model_year: String => "modelYear",
        daily_price: f64 => "dailyPrice",
        description: String => "description",
    }
}

impl Filterable for CarDto {
    type Criteria = CarCriteria;
}
