use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, IntoActiveModel, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, FieldDescriptor, Filterable, same_identity};
use crate::filtering::FieldKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rental")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub rent_date: Option<DateTimeUtc>,
    pub return_date: Option<DateTimeUtc>,
    pub customer_id: Option<i64>,
    pub car_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A customer renting a car between two dates.
///
/// Overlapping rentals of the same car are accepted.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalDto {
    pub id: Option<i64>,
    pub rent_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub customer_id: Option<i64>,
    pub car_id: Option<i64>,
}

impl PartialEq for RentalDto {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[async_trait::async_trait]
impl CrudResource for RentalDto {
    type EntityType = Entity;
    type ColumnType = Column;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "rental";
    const RESOURCE_NAME_PLURAL: &'static str = "rentals";
    const FIELDS: &'static [FieldDescriptor<Column>] = &[
        FieldDescriptor::new("rentDate", Column::RentDate, FieldKind::Timestamp),
        FieldDescriptor::new("returnDate", Column::ReturnDate, FieldKind::Timestamp),
        FieldDescriptor::new("customerId", Column::CustomerId, FieldKind::Long),
        FieldDescriptor::new("carId", Column::CarId, FieldKind::Long),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: Some(model.id),
            rent_date: model.rent_date,
            return_date: model.return_date,
            customer_id: model.customer_id,
            car_id: model.car_id,
        }
    }

    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            rent_date: ActiveValue::Set(self.rent_date),
            return_date: ActiveValue::Set(self.return_date),
            customer_id: ActiveValue::Set(self.customer_id),
            car_id: ActiveValue::Set(self.car_id),
        }
    }

    fn merge_into_active_model(self, existing: Model) -> ActiveModel {
        let mut active = existing.into_active_model();
        if let Some(value) = self.rent_date {
            active.rent_date = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.return_date {
            active.return_date = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.customer_id {
            active.customer_id = ActiveValue::Set(Some(value));
        }
        if let Some(value) = self.car_id {
            active.car_id = ActiveValue::Set(Some(value));
        }
        active
    }
}

crate::criteria! {
    /// Filters accepted by `GET /api/rentals`.
    pub struct RentalCriteria {
        id: i64 => "id",
        rent_date: DateTime<Utc> => "rentDate",
        return_date: DateTime<Utc> => "returnDate",
        customer_id: i64 => "customerId",
        car_id: i64 => "carId",
    }
}

impl Filterable for RentalDto {
    type Criteria = RentalCriteria;
}
