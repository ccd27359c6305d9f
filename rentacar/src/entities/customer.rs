use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub company_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A corporate customer, linked to a user account by `user_id`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub company_name: Option<String>,
}

impl PartialEq for CustomerDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for CustomerDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "customer";
    const RESOURCE_NAME_PLURAL: &'static str = "customers";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("userId", Column::UserId, FieldKind::Long),
        FieldDescriptor::new("companyName", Column::CompanyName, FieldKind::Text),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            user_id: model.user_id,
            company_name: model.company_name,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            user_id: ActiveValue::Set(self.user_id),
            company_name: ActiveValue::Set(self.company_name),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.user_id {
            active.user_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.company_name {
            active.company_name = ActiveValue::Set(Some(value));
        }
        active
    }
}
