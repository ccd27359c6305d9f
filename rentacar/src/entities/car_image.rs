use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, Filterable, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub car_id: Option<i64>,
    pub image_path: Option<String>,
    pub date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A picture of a car, stored by path.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarImageDto {
    pub id: Option<i64>,
    pub car_id: Option<i64>,
    pub image_path: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl PartialEq for CarImageDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for CarImageDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "car-image";
    const RESOURCE_NAME_PLURAL: &'static str = "car-images";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("carId", Column::CarId, FieldKind::Long),
        FieldDescriptor::new("imagePath", Column::ImagePath, FieldKind::Text),
        FieldDescriptor::new("date", Column::Date, FieldKind::Timestamp),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            car_id: model.car_id,
            image_path: model.image_path,
            date: model.date,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            car_id: ActiveValue::Set(self.car_id),
            image_path: ActiveValue::Set(self.image_path),
            date: ActiveValue::Set(self.date),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.car_id {
            active.car_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.image_path {
            active.image_path = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.date {
            active.date = ActiveValue::Set(Some(value));
        }
        active
    }
}

crate::criteria! {
    /// Filters accepted by `GET /api/car-images`.
    pub struct CarImageCriteria {
        id: i64 => "id",
        car_id: i64 => "carId",
        image_path: String => "imagePath",
        date: DateTime<Utc> => "date",
    }
}

impl Filterable for CarImageDto {
    type Criteria = CarImageCriteria;
}
