use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, Filterable, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "color")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub color_id: Option<i64>,
    pub color_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorDto {
    pub id: Option<i64>,
    pub color_id: Option<i64>,
    pub color_name: Option<String>,
}

impl PartialEq for ColorDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for ColorDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "color";
    const RESOURCE_NAME_PLURAL: &'static str = "colors";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("colorId", Column::ColorId, FieldKind::Long),
        FieldDescriptor::new("colorName", Column::ColorName, FieldKind::Text),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            color_id: model.color_id,
            color_name: model.color_name,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            color_id: ActiveValue::Set(self.color_id),
            color_name: ActiveValue::Set(self.color_name),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.color_id {
            active.color_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.color_name {
            active.color_name = ActiveValue::Set(Some(value));
        }
        active
    }
}

crate::criteria! {
    /// Filters accepted by `GET /api/colors`.
    pub struct ColorCriteria {
        id: i64 => "id",
        color_id: i64 => "colorId",
        color_name: String => "colorName",
    }
}

impl Filterable for ColorDto {
    type Criteria = ColorCriteria;
}
